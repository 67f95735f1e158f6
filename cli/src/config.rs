// SPDX-FileCopyrightText: 2026 The iiomon developers
//
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::common::{emit_error, ConfigOpts, EmitOpts};
use clap::Parser;
use iiomon::VolumeConfig;

#[derive(Debug, Parser)]
#[command(aliases(["cfg"]))]
pub struct Opts {
    #[command(flatten)]
    config: ConfigOpts,

    #[command(flatten)]
    emit: EmitOpts,
}

pub fn cmd(opts: &Opts) -> bool {
    match opts.config.load() {
        Ok(cfg) => {
            emit_config(&cfg, &opts.emit);
            true
        }
        Err(e) => {
            emit_error(&opts.emit, &e);
            false
        }
    }
}

fn emit_config(cfg: &VolumeConfig, opts: &EmitOpts) {
    #[cfg(feature = "json")]
    if opts.json {
        match serde_json::to_string(cfg) {
            Ok(s) => println!("{s}"),
            Err(e) => eprintln!("{e}"),
        }
        return;
    }
    #[cfg(not(feature = "json"))]
    let _ = opts;
    println!("{cfg}");
}
