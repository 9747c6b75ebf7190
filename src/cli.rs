// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{crate_version, value_parser, Arg, ArgAction, Command};

fn json_flags(c: Command) -> Command {
    c.arg(
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .help("Print as pretty JSON"),
    )
    .arg(
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .conflicts_with("json")
            .help("Print as JSON lines"),
    )
}

fn filter_args(c: Command) -> Command {
    c.arg(
        Arg::new("category")
            .long("category")
            .help("Exact category, or 'all'"),
    )
    .arg(
        Arg::new("period")
            .long("period")
            .help("all | today | week | month"),
    )
}

fn out_dir(c: Command) -> Command {
    c.arg(
        Arg::new("out")
            .long("out")
            .default_value(".")
            .help("Directory to write the file into"),
    )
}

pub fn build_cli() -> Command {
    Command::new("spendsight")
        .version(crate_version!())
        .about("Track expenses, budgets, and spending trends")
        .subcommand(
            Command::new("signup")
                .about("Create an account")
                .arg(Arg::new("name").long("name").required(true))
                .arg(Arg::new("email").long("email").required(true))
                .arg(
                    Arg::new("password")
                        .long("password")
                        .help("Prompted for when omitted"),
                )
                .arg(Arg::new("confirm").long("confirm"))
                .arg(
                    Arg::new("accept-terms")
                        .long("accept-terms")
                        .action(ArgAction::SetTrue)
                        .help("Agree to the Terms and Privacy Policy"),
                ),
        )
        .subcommand(
            Command::new("login")
                .about("Sign in")
                .arg(
                    Arg::new("email")
                        .long("email")
                        .help("Defaults to the remembered email"),
                )
                .arg(
                    Arg::new("password")
                        .long("password")
                        .help("Prompted for when omitted"),
                )
                .arg(
                    Arg::new("remember")
                        .long("remember")
                        .action(ArgAction::SetTrue)
                        .help("Remember this email on this device"),
                ),
        )
        .subcommand(Command::new("logout").about("Sign out"))
        .subcommand(Command::new("whoami").about("Show the signed-in user"))
        .subcommand(
            Command::new("expense")
                .about("Record and manage expenses")
                .subcommand(
                    Command::new("add")
                        .arg(Arg::new("amount").long("amount").required(true))
                        .arg(Arg::new("category").long("category").required(true))
                        .arg(
                            Arg::new("description")
                                .long("description")
                                .required(true),
                        )
                        .arg(
                            Arg::new("date")
                                .long("date")
                                .help("YYYY-MM-DD, defaults to today"),
                        ),
                )
                .subcommand(json_flags(filter_args(
                    Command::new("list").arg(
                        Arg::new("limit")
                            .long("limit")
                            .value_parser(value_parser!(usize)),
                    ),
                )))
                .subcommand(
                    Command::new("edit")
                        .arg(Arg::new("id").required(true))
                        .arg(Arg::new("amount").long("amount"))
                        .arg(Arg::new("category").long("category"))
                        .arg(Arg::new("description").long("description"))
                        .arg(Arg::new("date").long("date")),
                )
                .subcommand(
                    Command::new("rm")
                        .arg(Arg::new("id").required(true))
                        .arg(
                            Arg::new("yes")
                                .long("yes")
                                .short('y')
                                .action(ArgAction::SetTrue)
                                .help("Skip confirmation"),
                        ),
                ),
        )
        .subcommand(json_flags(filter_args(
            Command::new("summary").about("Totals, budget status, and spending charts"),
        )))
        .subcommand(
            Command::new("budget")
                .about("Monthly budget")
                .subcommand(
                    Command::new("set")
                        .arg(
                            Arg::new("amount")
                                .required(true)
                                .allow_hyphen_values(true)
                                .help("0 clears the budget"),
                        ),
                )
                .subcommand(json_flags(Command::new("status"))),
        )
        .subcommand(
            Command::new("currency")
                .about("Display currency")
                .subcommand(Command::new("set").arg(Arg::new("currency").required(true)))
                .subcommand(Command::new("list")),
        )
        .subcommand(
            Command::new("export")
                .about("Export the filtered expense list")
                .subcommand(out_dir(filter_args(Command::new("csv"))))
                .subcommand(out_dir(filter_args(
                    Command::new("report").arg(
                        Arg::new("format")
                            .long("format")
                            .default_value("text")
                            .value_parser(["text", "json"]),
                    ),
                ))),
        )
}
