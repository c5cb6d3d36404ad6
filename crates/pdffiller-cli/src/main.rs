mod cli;
mod data;
mod dump_cmd;
mod exit_codes;
mod fill_cmd;
mod logging;
mod shared;

use clap::Parser;
use cli::{Cli, Commands};

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            let code = if e.use_stderr() {
                exit_codes::ERROR_GENERAL
            } else {
                exit_codes::SUCCESS
            };
            std::process::exit(code);
        }
    };

    if let Err(code) = logging::init(&cli.global) {
        std::process::exit(code);
    }
    let password = cli.global.password.as_deref();

    let result = match cli.command {
        Commands::DumpDataFields { ref file, format } => dump_cmd::run(file, format, password),
        Commands::FillForm {
            ref file,
            ref output,
            ref data,
            ref input_data,
            flatten,
            on_failure,
        } => fill_cmd::run(&fill_cmd::FillArgs {
            file,
            output,
            data: data.as_deref(),
            input_data: input_data.as_deref(),
            flatten,
            on_failure,
            password,
        }),
    };

    if let Err(code) = result {
        std::process::exit(code);
    }
}
