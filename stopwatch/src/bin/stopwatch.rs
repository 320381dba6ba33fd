// Copyright 2022-2023 VMware, Inc.
// SPDX-License-Identifier: BSD-2-Clause

//! Implementation of the `stopwatch` binary. Everything interesting is in
//! [`stopwatch::time_run::Time`].

use std::process::ExitCode;

use clap::Parser;
use stopwatch::time_run::Time;

fn main() -> ExitCode {
    pretty_env_logger::init();
    let app = Time::parse();
    app.exec()
}
