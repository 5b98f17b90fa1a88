// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command, value_parser};

fn json_flags(cmd: Command) -> Command {
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
            .help("Print one JSON object per line"),
    )
}

fn required(name: &'static str) -> Arg {
    Arg::new(name).long(name).required(true)
}

fn optional(name: &'static str) -> Arg {
    Arg::new(name).long(name)
}

pub fn build_cli() -> Command {
    Command::new("pocketvault")
        .about("Savings-goal ledger with layered local storage, snapshots, and backup codes")
        .version(env!("CARGO_PKG_VERSION"))
        .subcommand(Command::new("init").about("Probe storage and create an empty state"))
        .subcommand(json_flags(
            Command::new("backend").about("Show which storage backends are usable"),
        ))
        .subcommand(Command::new("doctor").about("Check snapshot index and storage health"))
        .subcommand(
            Command::new("state")
                .about("Canonical application state")
                .subcommand(json_flags(Command::new("show").about("Print the healed state")))
                .subcommand(Command::new("clear").about("Remove the stored state"))
                .subcommand(
                    Command::new("import")
                        .about("Replace the state from a JSON file (state, wrapper, or backup code)")
                        .arg(required("path")),
                ),
        )
        .subcommand(
            Command::new("tx")
                .about("Income and expense transactions")
                .subcommand(
                    Command::new("add")
                        .arg(required("type").help("income|expense"))
                        .arg(optional("currency").default_value("USD").help("USD|AED|TL"))
                        .arg(optional("amount").value_parser(value_parser!(u64)))
                        .arg(optional("category").default_value(""))
                        .arg(optional("note").default_value(""))
                        .arg(optional("date").help("YYYY-MM-DD"))
                        .arg(optional("grams").help("Gold grams received instead of cash")),
                )
                .subcommand(Command::new("rm").arg(required("id")))
                .subcommand(json_flags(
                    Command::new("list").arg(
                        optional("limit")
                            .value_parser(value_parser!(usize))
                            .help("Show at most N rows"),
                    ),
                )),
        )
        .subcommand(
            Command::new("buy")
                .about("TL spent on USD or gold")
                .subcommand(
                    Command::new("add")
                        .arg(required("asset").help("USD|GOLD"))
                        .arg(required("spent").help("TL spent"))
                        .arg(required("qty").help("USD amount or gold grams"))
                        .arg(optional("date").help("YYYY-MM-DD")),
                )
                .subcommand(Command::new("rm").arg(required("id")))
                .subcommand(json_flags(Command::new("list"))),
        )
        .subcommand(
            Command::new("note")
                .about("Notes with checklists")
                .subcommand(
                    Command::new("add")
                        .arg(optional("title").default_value(""))
                        .arg(optional("tag").default_value(""))
                        .arg(optional("body").default_value(""))
                        .arg(optional("item").action(ArgAction::Append)),
                )
                .subcommand(
                    Command::new("edit")
                        .arg(required("id"))
                        .arg(optional("title"))
                        .arg(optional("tag"))
                        .arg(optional("body"))
                        .arg(optional("photo").help("Attach a photo URI")),
                )
                .subcommand(
                    Command::new("check")
                        .arg(required("id"))
                        .arg(required("item").value_parser(value_parser!(usize))),
                )
                .subcommand(json_flags(Command::new("list"))),
        )
        .subcommand(
            Command::new("todo")
                .about("To-do items")
                .subcommand(
                    Command::new("add")
                        .arg(required("text"))
                        .arg(optional("tag").default_value("")),
                )
                .subcommand(Command::new("toggle").arg(required("id")))
                .subcommand(Command::new("rm").arg(required("id")))
                .subcommand(json_flags(Command::new("list"))),
        )
        .subcommand(
            Command::new("snapshot")
                .about("Named save slots in local storage")
                .subcommand(Command::new("create").arg(optional("name").default_value("")))
                .subcommand(json_flags(Command::new("list")))
                .subcommand(Command::new("restore").arg(required("id")))
                .subcommand(Command::new("rm").arg(required("id"))),
        )
        .subcommand(
            Command::new("file")
                .about("Snapshots as standalone files")
                .subcommand(
                    Command::new("save")
                        .arg(optional("name").default_value(""))
                        .arg(
                            Arg::new("user-dir")
                                .long("user-dir")
                                .action(ArgAction::SetTrue)
                                .help("Write into the granted directory"),
                        )
                        .arg(
                            Arg::new("repick")
                                .long("repick")
                                .action(ArgAction::SetTrue)
                                .help("Ask for the directory again"),
                        )
                        .arg(optional("dir").help("Directory to grant when asked"))
                        .arg(optional("outbox").help("Copy the written file here (share)")),
                )
                .subcommand(json_flags(Command::new("list")))
                .subcommand(Command::new("restore").arg(required("id")))
                .subcommand(Command::new("rm").arg(required("id")))
                .subcommand(
                    Command::new("pick")
                        .about("Import a snapshot file and restore it")
                        .arg(optional("path").help("File to pick; omit to cancel")),
                ),
        )
        .subcommand(
            Command::new("backup")
                .about("Compact backup codes for copy/paste transfer")
                .subcommand(Command::new("export").arg(optional("out")))
                .subcommand(
                    Command::new("import")
                        .arg(optional("code").conflicts_with("path"))
                        .arg(optional("path")),
                ),
        )
        .subcommand(
            Command::new("export")
                .about("Export ledger data")
                .subcommand(
                    Command::new("transactions")
                        .arg(optional("format").default_value("csv").help("csv|json"))
                        .arg(required("out")),
                ),
        )
        .subcommand(
            Command::new("market")
                .about("Cached FX rates")
                .subcommand(Command::new("fetch").about("Fetch USD/TRY and USD/AED"))
                .subcommand(json_flags(Command::new("show"))),
        )
}
