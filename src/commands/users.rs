// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use rusqlite::Connection;

use crate::store;
use crate::utils::pretty_table;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let username = sub.get_one::<String>("username").unwrap();
            let id = store::insert_user(conn, username)?;
            println!("Added user '{}' (#{})", username, id);
        }
        Some(("list", _)) => {
            let mut data = Vec::new();
            for (id, username) in store::list_users(conn)? {
                data.push(vec![id.to_string(), username]);
            }
            println!("{}", pretty_table(&["Id", "Username"], data));
        }
        _ => {}
    }
    Ok(())
}
