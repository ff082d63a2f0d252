//! Parsing Options.
//! `pn-reach <net.pnml> [-c config.toml] [-o report.json] [--dot-graph FILE] [--dot-net FILE] [--list]`

use std::path::PathBuf;

use anyhow::Result;
use clap::{Arg, ArgAction, Command, value_parser};

fn make_options_parser() -> clap::Command {
    Command::new("pn-reach")
        .no_binary_name(true)
        .version("v0.1.0")
        .about("Symbolic reachability of 1-safe Petri nets, cross-checked by BFS/DFS")
        .arg(
            Arg::new("net")
                .value_name("NET")
                .help("PNML file to analyse")
                .required(true),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("TOML configuration file")
                .default_value("pn-reach.toml"),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("FILE")
                .help("Path to file where the JSON comparison report will be stored"),
        )
        .arg(
            Arg::new("dot-graph")
                .long("dot-graph")
                .value_name("FILE")
                .help("Write the explicit state graph in DOT format"),
        )
        .arg(
            Arg::new("dot-net")
                .long("dot-net")
                .value_name("FILE")
                .help("Write the net itself in DOT format"),
        )
        .arg(
            Arg::new("list")
                .short('l')
                .long("list")
                .action(ArgAction::SetTrue)
                .help("List every reachable marking by its marked places"),
        )
        .arg(
            Arg::new("max-iterations")
                .long("max-iterations")
                .value_name("N")
                .value_parser(value_parser!(usize))
                .help("Override the iteration cap of the configuration"),
        )
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    pub net: PathBuf,
    pub config: PathBuf,
    pub output: Option<PathBuf>,
    pub dot_graph: Option<PathBuf>,
    pub dot_net: Option<PathBuf>,
    pub list: bool,
    pub max_iterations: Option<usize>,
}

impl Options {
    pub fn parse_from_str(s: &str) -> Result<Self> {
        let flags = shellwords::split(s)?;
        Self::parse_from_args(&flags)
    }

    pub fn parse_from_args(flags: &[String]) -> Result<Self> {
        let app = make_options_parser();
        let matches = app.try_get_matches_from(flags.iter())?;
        let path = |id: &str| matches.get_one::<String>(id).map(PathBuf::from);

        Ok(Options {
            net: path("net").unwrap_or_default(),
            config: path("config").unwrap_or_default(),
            output: path("output"),
            dot_graph: path("dot-graph"),
            dot_net: path("dot-net"),
            list: matches.get_flag("list"),
            max_iterations: matches.get_one::<usize>("max-iterations").copied(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_from_str() {
        let options =
            Options::parse_from_str("nets/fork.pnml -o 'out dir/report.json' --list").unwrap();
        assert_eq!(options.net, PathBuf::from("nets/fork.pnml"));
        assert_eq!(options.config, PathBuf::from("pn-reach.toml"));
        assert_eq!(options.output, Some(PathBuf::from("out dir/report.json")));
        assert!(options.list);
        assert_eq!(options.max_iterations, None);
    }

    #[test]
    fn test_parse_from_args() {
        let options = Options::parse_from_args(&[
            "net.pnml".to_owned(),
            "-c".to_owned(),
            "ci.toml".to_owned(),
            "--max-iterations".to_owned(),
            "12".to_owned(),
        ])
        .unwrap();
        assert_eq!(options.config, PathBuf::from("ci.toml"));
        assert_eq!(options.max_iterations, Some(12));
        assert!(!options.list);
    }

    #[test]
    fn test_parse_from_str_err() {
        assert!(Options::parse_from_str("").is_err());
        assert!(Options::parse_from_str("net.pnml --max-iterations many").is_err());
        assert!(Options::parse_from_str("net.pnml -k unknown").is_err());
    }
}
