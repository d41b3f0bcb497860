use clap::ValueEnum;

/// The only external export target the CLI currently names; kept as an
/// enum rather than a bare bool so a second target has somewhere to land.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportTarget {
    Clickhouse,
}
