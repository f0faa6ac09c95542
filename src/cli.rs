// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command, value_parser};

const TX_TYPES: [&str; 4] = ["deposit", "withdraw", "gains", "losses"];

fn json_flags(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .help("Print pretty JSON"),
    )
    .arg(
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .conflicts_with("json")
            .help("Print one JSON object per line"),
    )
}

fn tx_fields(cmd: Command, required: bool) -> Command {
    cmd.arg(
        Arg::new("type")
            .long("type")
            .required(required)
            .value_parser(TX_TYPES),
    )
    .arg(Arg::new("amount").long("amount").required(required))
    .arg(Arg::new("date").long("date").help("YYYY-MM-DD, defaults to today"))
    .arg(Arg::new("category").long("category"))
    .arg(Arg::new("description").long("description"))
    .arg(
        Arg::new("initial-bank")
            .long("initial-bank")
            .action(ArgAction::SetTrue)
            .help("Mark a deposit as the starting bankroll"),
    )
}

fn objective_fields(cmd: Command, required: bool) -> Command {
    cmd.arg(Arg::new("title").long("title").required(required))
        .arg(Arg::new("target").long("target").required(required))
        .arg(Arg::new("current").long("current"))
        .arg(Arg::new("date").long("date").help("Target date, YYYY-MM-DD"))
        .arg(Arg::new("category").long("category"))
        .arg(Arg::new("description").long("description"))
}

fn export_args(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("format")
            .long("format")
            .required(true)
            .help("csv|json"),
    )
    .arg(Arg::new("out").long("out").required(true))
}

pub fn build_cli() -> Command {
    Command::new("bankroll")
        .about("Bettor bankroll tracker: ledger, daily counters and stop-loss")
        .version(env!("CARGO_PKG_VERSION"))
        .subcommand_required(false)
        .subcommand(
            Command::new("login")
                .about("Sign in and remember the session on this device")
                .arg(Arg::new("email").long("email").required(true))
                .arg(Arg::new("password").long("password").required(true)),
        )
        .subcommand(Command::new("logout").about("Forget the session and local cache"))
        .subcommand(json_flags(
            Command::new("sync").about("Refresh the local cache from the server"),
        ))
        .subcommand(
            Command::new("tx")
                .about("Ledger transactions")
                .subcommand(tx_fields(Command::new("add"), true))
                .subcommand(json_flags(
                    Command::new("list")
                        .arg(Arg::new("type").long("type").value_parser(TX_TYPES))
                        .arg(Arg::new("category").long("category"))
                        .arg(Arg::new("month").long("month").help("YYYY-MM"))
                        .arg(
                            Arg::new("limit")
                                .long("limit")
                                .value_parser(value_parser!(usize)),
                        ),
                ))
                .subcommand(tx_fields(
                    Command::new("update").arg(Arg::new("id").required(true)),
                    false,
                ))
                .subcommand(Command::new("delete").arg(Arg::new("id").required(true))),
        )
        .subcommand(json_flags(
            Command::new("balance").about("Current balance and ledger figures"),
        ))
        .subcommand(json_flags(
            Command::new("chart")
                .about("Running balance series")
                .arg(
                    Arg::new("window")
                        .long("window")
                        .default_value("30d")
                        .help("today|7d|30d|90d|all"),
                )
                .arg(
                    Arg::new("by")
                        .long("by")
                        .default_value("day")
                        .help("hour|day|month"),
                ),
        ))
        .subcommand(json_flags(
            Command::new("calendar")
                .about("Month grid of daily activity")
                .arg(Arg::new("month").long("month").help("YYYY-MM, defaults to this month"))
                .arg(Arg::new("day").long("day").help("Show one day, YYYY-MM-DD")),
        ))
        .subcommand(json_flags(
            Command::new("risk").about("Stop-loss status").arg(
                Arg::new("daily")
                    .long("daily")
                    .action(ArgAction::SetTrue)
                    .help("Check today's losses against the stop-loss value"),
            ),
        ))
        .subcommand(
            Command::new("profile")
                .about("Risk profile")
                .subcommand(json_flags(Command::new("show")))
                .subcommand(
                    Command::new("set")
                        .arg(
                            Arg::new("preset")
                                .long("preset")
                                .value_parser(["cautious", "balanced", "highrisk"]),
                        )
                        .arg(
                            Arg::new("risk-level")
                                .long("risk-level")
                                .value_parser(value_parser!(u8).range(0..=10)),
                        )
                        .arg(Arg::new("stop-loss-pct").long("stop-loss-pct"))
                        .arg(Arg::new("stop-loss").long("stop-loss"))
                        .arg(Arg::new("profit-target").long("profit-target"))
                        .arg(Arg::new("initial-balance").long("initial-balance")),
                )
                .subcommand(json_flags(
                    Command::new("recommend").arg(
                        Arg::new("risk-level")
                            .long("risk-level")
                            .value_parser(value_parser!(u8).range(0..=10)),
                    ),
                )),
        )
        .subcommand(
            Command::new("daily")
                .about("Daily gains/losses counters")
                .subcommand(json_flags(Command::new("status")))
                .subcommand(Command::new("check").about("Run the day-rollover check now"))
                .subcommand(
                    Command::new("watch")
                        .about("Run the rollover check periodically")
                        .arg(
                            Arg::new("ticks")
                                .long("ticks")
                                .value_parser(value_parser!(u64))
                                .help("Stop after this many checks"),
                        )
                        .arg(
                            Arg::new("interval")
                                .long("interval")
                                .value_parser(value_parser!(u64).range(1..))
                                .help("Seconds between checks"),
                        ),
                ),
        )
        .subcommand(
            Command::new("objective")
                .about("Savings objectives")
                .subcommand(json_flags(Command::new("list")))
                .subcommand(objective_fields(Command::new("add"), true))
                .subcommand(objective_fields(
                    Command::new("update").arg(Arg::new("id").required(true)),
                    false,
                ))
                .subcommand(Command::new("delete").arg(Arg::new("id").required(true))),
        )
        .subcommand(
            Command::new("report")
                .about("Ledger reports")
                .subcommand(json_flags(Command::new("summary")))
                .subcommand(json_flags(Command::new("monthly")))
                .subcommand(json_flags(Command::new("categories")))
                .subcommand(
                    Command::new("analytics")
                        .about("Server-side analytics, printed as JSON")
                        .arg(
                            Arg::new("kind")
                                .long("kind")
                                .default_value("overview")
                                .value_parser(["overview", "monthly", "performance", "risk"]),
                        )
                        .arg(
                            Arg::new("jsonl")
                                .long("jsonl")
                                .action(ArgAction::SetTrue)
                                .help("Print on a single line"),
                        ),
                ),
        )
        .subcommand(
            Command::new("export")
                .about("Write ledger data to a file")
                .subcommand(export_args(Command::new("transactions")))
                .subcommand(export_args(Command::new("summary"))),
        )
        .subcommand(
            Command::new("config")
                .about("Local settings")
                .subcommand(json_flags(Command::new("show")))
                .subcommand(
                    Command::new("set")
                        .arg(Arg::new("key").required(true))
                        .arg(Arg::new("value").required(true)),
                ),
        )
}
