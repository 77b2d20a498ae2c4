use std::process::ExitCode;

use clap::Parser;

use article_forge::cli::Cli;

fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    article_forge::init_tracing();

    match Cli::parse().run() {
        Ok(path) => {
            println!("{}", path.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "Article generation failed");
            ExitCode::FAILURE
        }
    }
}
