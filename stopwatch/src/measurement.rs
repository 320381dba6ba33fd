// Copyright 2022-2023 VMware, Inc.
// SPDX-License-Identifier: BSD-2-Clause

//! The result of timing a single run.

use std::{error::Error, fmt, time::Duration};

use serde::{Deserialize, Serialize};

use crate::command::TargetCommand;

/// `RunMeasurement` holds what was observed about a single run: the elapsed
/// wall-clock time between just before the spawn and just after the wait, and
/// some extra information about how the child finished.
///
/// All of the reported units are derived from one nanosecond count, so they
/// always agree with each other.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunMeasurement {
    /// The command that was run.
    pub command: TargetCommand,
    /// Elapsed time of run.
    pub real_time: Duration,
    /// User time of the child (and its children).
    pub user_time: Duration,
    /// System time of the child (and its children).
    pub sys_time: Duration,
    /// Exit code of the shell, `None` if it was terminated by a signal.
    pub exit_code: Option<i32>,
}

impl RunMeasurement {
    /// Elapsed time in whole nanoseconds.
    pub fn elapsed_ns(&self) -> u128 {
        self.real_time.as_nanos()
    }

    /// Elapsed time in microseconds.
    pub fn elapsed_us(&self) -> f64 {
        self.elapsed_ns() as f64 / 1_000.0
    }

    /// Elapsed time in seconds.
    pub fn elapsed_s(&self) -> f64 {
        self.elapsed_ns() as f64 / 1_000_000_000.0
    }

    /// Whether the command exited with status 0. This does not affect the
    /// measurement; a failing command is timed like any other.
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// The one-line timing report.
    pub fn report(&self) -> Report<'_> {
        Report(self)
    }

    /// Print a human-readable version of these results.
    pub fn print(&self) {
        println!();
        println!("{}", self.report());
    }

    /// Convert these results to a compact JSON representation.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).expect("could not serialize `RunMeasurement`")
    }

    /// Parse results serialized as JSON.
    pub fn from_json(s: &str) -> Result<Self, Box<dyn Error>> {
        let v = serde_json::from_str(s)?;
        Ok(v)
    }
}

/// Display adapter for the `Total time: ...` line of a [`RunMeasurement`].
#[derive(Debug, Clone, Copy)]
pub struct Report<'a>(&'a RunMeasurement);

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let m = self.0;
        write!(
            f,
            "Total time: {:.3} seconds = {:.3} us = {} ns",
            m.elapsed_s(),
            m.elapsed_us(),
            m.elapsed_ns()
        )
    }
}
