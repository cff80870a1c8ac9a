// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use rusqlite::Connection;

use crate::store;
use crate::utils::{parse_tx_type, pretty_table};

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let name = sub.get_one::<String>("name").unwrap();
            let kind = parse_tx_type(sub.get_one::<String>("type").unwrap())?;
            let user_id = sub.get_one::<i64>("user").copied();
            store::insert_category(conn, name, kind, user_id)?;
            let scope = if user_id.is_some() { "own" } else { "global" };
            println!("Added {} {} category '{}'", scope, kind.label(), name);
        }
        Some(("list", sub)) => {
            let user_id = *sub.get_one::<i64>("user").unwrap();
            let mut data = Vec::new();
            for cat in store::list_categories(conn, user_id)? {
                let scope = if cat.user_id.is_some() { "own" } else { "global" };
                data.push(vec![
                    cat.name,
                    cat.kind.label().to_string(),
                    scope.to_string(),
                ]);
            }
            println!("{}", pretty_table(&["Category", "Type", "Scope"], data));
        }
        _ => {}
    }
    Ok(())
}
