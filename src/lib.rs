pub mod chapters;
pub mod cli;
pub mod config;
pub mod crossover;
pub mod extract;
pub mod figures;
pub mod latex;
pub mod report;
pub mod translate;
pub mod translator;
pub mod util;
