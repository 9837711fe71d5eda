// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command, value_parser};

/// Upper bound for day-count windows, roughly ten years.
pub const MAX_WINDOW_DAYS: u32 = 3660;

fn json_args(cmd: Command) -> Command {
    cmd.arg(
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

fn today_arg() -> Arg {
    Arg::new("today")
        .long("today")
        .value_name("YYYY-MM-DD")
        .help("Evaluate as of this date instead of the local date")
}

fn mode_arg() -> Arg {
    Arg::new("mode")
        .long("mode")
        .value_name("MODE")
        .help("Period mode: next-paycheck | end-of-month (defaults to the stored setting)")
}

fn recurrence_args(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("every")
            .long("every")
            .value_name("FREQUENCY")
            .help("none | daily | weekly | biweekly | semimonthly | monthly | quarterly | yearly"),
    )
    .arg(
        Arg::new("interval")
            .long("interval")
            .value_parser(value_parser!(u32))
            .default_value("1")
            .help("Repeat every N periods (ignored for semimonthly)"),
    )
}

pub fn build_cli() -> Command {
    Command::new("clip")
        .about("Daily spending power, recurring ledger projection and performance streaks")
        .version(clap::crate_version!())
        .subcommand(Command::new("init").about("Create the database"))
        .subcommand(
            Command::new("config")
                .about("Read or change settings")
                .subcommand(
                    Command::new("get")
                        .arg(Arg::new("key").long("key").help("Only show this setting")),
                )
                .subcommand(
                    Command::new("set")
                        .arg(Arg::new("key").long("key").required(true))
                        .arg(Arg::new("value").long("value").required(true)),
                ),
        )
        .subcommand(
            Command::new("balance")
                .about("Current account balance snapshot")
                .subcommand(
                    Command::new("set")
                        .arg(Arg::new("amount").long("amount").required(true).allow_hyphen_values(true))
                        .arg(Arg::new("as_of").long("as-of").value_name("YYYY-MM-DD")),
                )
                .subcommand(json_args(Command::new("show"))),
        )
        .subcommand(
            Command::new("ledger")
                .about("Planned income and expenses")
                .subcommand(recurrence_args(
                    Command::new("add")
                        .arg(
                            Arg::new("kind")
                                .long("kind")
                                .required(true)
                                .value_parser(["income", "expense"]),
                        )
                        .arg(Arg::new("name").long("name").required(true))
                        .arg(Arg::new("amount").long("amount").required(true).allow_hyphen_values(true))
                        .arg(Arg::new("date").long("date").required(true))
                        .arg(Arg::new("category").long("category")),
                ))
                .subcommand(json_args(
                    Command::new("list").arg(
                        Arg::new("kind")
                            .long("kind")
                            .value_parser(["income", "expense"]),
                    ),
                ))
                .subcommand(Command::new("rm").arg(Arg::new("id").long("id").required(true)))
                .subcommand(Command::new("settle").arg(Arg::new("id").long("id").required(true)))
                .subcommand(json_args(recurrence_args(
                    Command::new("preview")
                        .about("Show the next occurrences of an item or an ad-hoc rule")
                        .arg(Arg::new("id").long("id").conflicts_with("date"))
                        .arg(Arg::new("date").long("date"))
                        .arg(
                            Arg::new("count")
                                .long("count")
                                .value_parser(value_parser!(usize))
                                .default_value("3"),
                        ),
                ))),
        )
        .subcommand(json_args(
            Command::new("today")
                .about("Today's daily clip")
                .arg(today_arg())
                .arg(mode_arg()),
        ))
        .subcommand(json_args(
            Command::new("scenario")
                .about("Impact of a hypothetical expense on today's clip")
                .arg(Arg::new("amount").long("amount").required(true).allow_hyphen_values(true))
                .arg(today_arg())
                .arg(mode_arg()),
        ))
        .subcommand(json_args(
            Command::new("timeline")
                .about("Projected daily balance")
                .arg(
                    Arg::new("days")
                        .long("days")
                        .value_parser(value_parser!(u32).range(1..=i64::from(MAX_WINDOW_DAYS)))
                        .default_value("30"),
                )
                .arg(today_arg()),
        ))
        .subcommand(
            Command::new("perf")
                .about("Daily performance records")
                .subcommand(json_args(
                    Command::new("record")
                        .arg(Arg::new("date").long("date").help("Defaults to today"))
                        .arg(Arg::new("spent").long("spent").required(true).allow_hyphen_values(true))
                        .arg(
                            Arg::new("target")
                                .long("target")
                                .allow_hyphen_values(true)
                                .help("Defaults to the clip computed for that date"),
                        )
                        .arg(mode_arg()),
                ))
                .subcommand(json_args(
                    Command::new("history").arg(
                        Arg::new("limit")
                            .long("limit")
                            .value_parser(value_parser!(usize)),
                    ),
                ))
                .subcommand(json_args(
                    Command::new("summary")
                        .arg(
                            Arg::new("days")
                                .long("days")
                                .value_parser(
                                    value_parser!(i64).range(1..=i64::from(MAX_WINDOW_DAYS)),
                                )
                                .default_value("30"),
                        )
                        .arg(today_arg()),
                )),
        )
        .subcommand(json_args(Command::new("streak").about("Current streak and level")))
        .subcommand(json_args(
            Command::new("achievements")
                .about("Unlocked and available achievements")
                .arg(
                    Arg::new("unlocked")
                        .long("unlocked")
                        .action(ArgAction::SetTrue)
                        .help("Only show unlocked achievements"),
                ),
        ))
        .subcommand(
            Command::new("import")
                .about("Import data from CSV")
                .subcommand(
                    Command::new("ledger").arg(Arg::new("path").long("path").required(true)),
                ),
        )
        .subcommand(
            Command::new("export")
                .about("Export data")
                .subcommand(
                    Command::new("ledger")
                        .arg(
                            Arg::new("format")
                                .long("format")
                                .value_parser(["csv", "json"])
                                .default_value("csv"),
                        )
                        .arg(Arg::new("out").long("out").required(true)),
                )
                .subcommand(
                    Command::new("performance")
                        .arg(
                            Arg::new("format")
                                .long("format")
                                .value_parser(["csv", "json"])
                                .default_value("csv"),
                        )
                        .arg(Arg::new("out").long("out").required(true)),
                ),
        )
        .subcommand(
            Command::new("doctor")
                .about("Check stored state for inconsistencies")
                .arg(today_arg()),
        )
}
