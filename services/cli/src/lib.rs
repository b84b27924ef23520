mod cli;
mod commands;
mod demo;
mod infra;
mod render;

use landed_cost::error::AppError;

pub fn run() -> Result<(), AppError> {
    cli::run()
}
