// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command, value_parser};

fn user_arg() -> Arg {
    Arg::new("user")
        .long("user")
        .value_name("ID")
        .required(true)
        .value_parser(value_parser!(i64))
}

fn date_arg(name: &'static str) -> Arg {
    Arg::new(name)
        .long(name)
        .value_name("YYYY-MM-DD")
        .required(true)
}

fn type_arg() -> Arg {
    Arg::new("type")
        .long("type")
        .value_name("income|expense")
        .required(true)
}

fn json_flags(cmd: Command) -> Command {
    cmd.arg(Arg::new("json").long("json").action(ArgAction::SetTrue))
        .arg(Arg::new("jsonl").long("jsonl").action(ArgAction::SetTrue))
}

pub fn build_cli() -> Command {
    Command::new("tallybook")
        .about("Personal income/expense tracker: ledger, monthly reports, recurring postings")
        .subcommand(Command::new("init").about("Initialize the database"))
        .subcommand(
            Command::new("user")
                .about("Manage users")
                .subcommand(
                    Command::new("add")
                        .about("Add a user")
                        .arg(Arg::new("username").required(true)),
                )
                .subcommand(Command::new("list").about("List users")),
        )
        .subcommand(
            Command::new("category")
                .about("Manage categories")
                .subcommand(
                    Command::new("add")
                        .about("Add a category (global unless --user is given)")
                        .arg(Arg::new("name").required(true))
                        .arg(type_arg())
                        .arg(user_arg().required(false)),
                )
                .subcommand(
                    Command::new("list")
                        .about("List own and global categories")
                        .arg(user_arg()),
                ),
        )
        .subcommand(
            Command::new("tx")
                .about("Record and inspect transactions")
                .subcommand(
                    Command::new("add")
                        .about("Record a transaction")
                        .arg(user_arg())
                        .arg(date_arg("date"))
                        .arg(Arg::new("amount").long("amount").required(true))
                        .arg(Arg::new("category").long("category").required(true))
                        .arg(type_arg())
                        .arg(Arg::new("description").long("description")),
                )
                .subcommand(json_flags(
                    Command::new("list")
                        .about("List transactions (most recent first)")
                        .arg(user_arg())
                        .arg(date_arg("start").required(false))
                        .arg(date_arg("end").required(false))
                        .arg(
                            Arg::new("limit")
                                .long("limit")
                                .value_parser(value_parser!(usize)),
                        ),
                ))
                .subcommand(
                    Command::new("edit")
                        .about("Edit an owned transaction")
                        .arg(user_arg())
                        .arg(
                            Arg::new("id")
                                .long("id")
                                .required(true)
                                .value_parser(value_parser!(i64)),
                        )
                        .arg(date_arg("date").required(false))
                        .arg(Arg::new("amount").long("amount"))
                        .arg(Arg::new("category").long("category"))
                        .arg(type_arg().required(false))
                        .arg(Arg::new("description").long("description")),
                )
                .subcommand(
                    Command::new("rm")
                        .about("Delete an owned transaction")
                        .arg(user_arg())
                        .arg(
                            Arg::new("id")
                                .long("id")
                                .required(true)
                                .value_parser(value_parser!(i64)),
                        ),
                ),
        )
        .subcommand(
            Command::new("report")
                .about("Aggregated reports over the ledger")
                .subcommand(json_flags(
                    Command::new("summary")
                        .about("Income, expense, and balance for a period")
                        .arg(user_arg())
                        .arg(date_arg("start"))
                        .arg(date_arg("end")),
                ))
                .subcommand(json_flags(
                    Command::new("categories")
                        .about("Per-category totals for a period")
                        .arg(user_arg())
                        .arg(date_arg("start"))
                        .arg(date_arg("end"))
                        .arg(type_arg()),
                ))
                .subcommand(json_flags(
                    Command::new("trend")
                        .about("Month-by-month income/expense trend")
                        .arg(user_arg())
                        .arg(
                            Arg::new("months")
                                .long("months")
                                .default_value("6")
                                .value_parser(value_parser!(u32)),
                        ),
                ))
                .subcommand(json_flags(
                    Command::new("by-day")
                        .about("Expenses by day of week")
                        .arg(user_arg())
                        .arg(date_arg("start"))
                        .arg(date_arg("end")),
                ))
                .subcommand(json_flags(
                    Command::new("by-time")
                        .about("Expenses by time of day")
                        .arg(user_arg())
                        .arg(date_arg("start"))
                        .arg(date_arg("end")),
                ))
                .subcommand(json_flags(
                    Command::new("top")
                        .about("Largest transactions of a type")
                        .arg(user_arg())
                        .arg(date_arg("start"))
                        .arg(date_arg("end"))
                        .arg(type_arg())
                        .arg(
                            Arg::new("limit")
                                .long("limit")
                                .default_value("5")
                                .value_parser(value_parser!(usize)),
                        ),
                ))
                .subcommand(json_flags(
                    Command::new("stats")
                        .about("Advanced statistics for a period")
                        .arg(user_arg())
                        .arg(date_arg("start"))
                        .arg(date_arg("end")),
                ))
                .subcommand(json_flags(
                    Command::new("overview")
                        .about("Dashboard snapshot: this month vs last month")
                        .arg(user_arg()),
                ))
                .subcommand(json_flags(
                    Command::new("print")
                        .about("Full printable report bundle")
                        .arg(user_arg())
                        .arg(date_arg("start"))
                        .arg(date_arg("end")),
                ))
                .subcommand(json_flags(
                    Command::new("months")
                        .about("Months that have transactions")
                        .arg(user_arg()),
                )),
        )
        .subcommand(
            Command::new("export")
                .about("Export ledger data to files")
                .subcommand(
                    Command::new("report")
                        .about("Write the period report as CSV")
                        .arg(user_arg())
                        .arg(date_arg("start"))
                        .arg(date_arg("end"))
                        .arg(Arg::new("out").long("out").required(true)),
                )
                .subcommand(
                    Command::new("transactions")
                        .about("Write the full ledger as CSV or JSON")
                        .arg(user_arg())
                        .arg(
                            Arg::new("format")
                                .long("format")
                                .value_name("csv|json")
                                .required(true),
                        )
                        .arg(Arg::new("out").long("out").required(true)),
                ),
        )
        .subcommand(
            Command::new("recurring")
                .about("Monthly recurring postings")
                .subcommand(
                    Command::new("add")
                        .about("Add a recurring expense rule")
                        .arg(user_arg())
                        .arg(Arg::new("amount").long("amount").required(true))
                        .arg(Arg::new("category").long("category").required(true))
                        .arg(
                            Arg::new("day")
                                .long("day")
                                .value_name("1-31")
                                .required(true)
                                .value_parser(value_parser!(u32)),
                        )
                        .arg(Arg::new("description").long("description")),
                )
                .subcommand(
                    Command::new("list")
                        .about("List recurring rules")
                        .arg(user_arg()),
                )
                .subcommand(
                    Command::new("run")
                        .about("Post all due recurring rules")
                        .arg(user_arg())
                        .arg(date_arg("date").required(false)),
                ),
        )
}
