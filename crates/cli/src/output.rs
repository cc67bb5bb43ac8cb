// SPDX-License-Identifier: MIT

use clap::ValueEnum;

/// Shared `-o/--output` choice across every subcommand.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}
