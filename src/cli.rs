//! Interface de linha de comando do laurel baseada em clap.
//!
//! Define a struct [`Cli`] com subcomandos [`Command`] (score, transitions,
//! demo) e flags globais (--config, --verbose).

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde_json::Value;

use crate::config::DEFAULT_CONFIG_PATH;
use crate::lifecycle::AchievementType;

/// Registro e verificação de conquistas estudantis.
#[derive(Debug, Parser)]
#[command(name = "laurel", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Arquivo de configuração; usa os defaults quando não existe.
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// Habilita logs em nível debug, ignorando o filtro configurado.
    #[arg(long, short, global = true, default_value_t = false)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Calcula os pontos que uma conquista receberia.
    Score {
        /// Tipo da conquista: academic, competition, organization,
        /// publication, certification ou other.
        #[arg(long = "type")]
        achievement_type: AchievementType,

        /// Campo de detalhe no formato chave=valor. Valores em JSON mantêm o tipo.
        #[arg(long = "detail", value_parser = parse_detail)]
        details: Vec<(String, Value)>,
    },

    /// Mostra a tabela de transições de status.
    Transitions,

    /// Executa a demonstração embutida com stores em memória.
    Demo,
}

/// Interpreta `chave=valor`; `rank=1` vira número, `competitionLevel=national` vira string.
fn parse_detail(raw: &str) -> Result<(String, Value), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got `{raw}`"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("missing key in `{raw}`"));
    }
    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((key.to_string(), value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use serde_json::json;

    #[test]
    fn cli_parses_score_subcommand() {
        let cli = Cli::parse_from([
            "laurel",
            "score",
            "--type",
            "competition",
            "--detail",
            "competitionLevel=international",
            "--detail",
            "rank=1",
        ]);
        match cli.command {
            Command::Score {
                achievement_type,
                details,
            } => {
                assert_eq!(achievement_type, AchievementType::Competition);
                assert_eq!(
                    details,
                    vec![
                        ("competitionLevel".to_string(), json!("international")),
                        ("rank".to_string(), json!(1)),
                    ]
                );
            }
            _ => panic!("expected Score command"),
        }
    }

    #[test]
    fn cli_rejects_unknown_type() {
        let result = Cli::try_parse_from(["laurel", "score", "--type", "hackathon"]);
        assert!(result.is_err());
    }

    #[test]
    fn cli_parses_global_flags() {
        let cli = Cli::parse_from(["laurel", "--config", "custom.toml", "--verbose", "demo"]);
        assert!(cli.verbose);
        assert_eq!(cli.config, PathBuf::from("custom.toml"));
        assert!(matches!(cli.command, Command::Demo));
    }

    #[test]
    fn cli_defaults_config_path() {
        let cli = Cli::parse_from(["laurel", "transitions"]);
        assert_eq!(cli.config, PathBuf::from(DEFAULT_CONFIG_PATH));
        assert!(!cli.verbose);
    }

    #[test]
    fn detail_parsing() {
        assert_eq!(parse_detail("rank=2"), Ok(("rank".into(), json!(2))));
        assert_eq!(
            parse_detail("venue=Jakarta Convention Center"),
            Ok(("venue".into(), json!("Jakarta Convention Center")))
        );
        assert!(parse_detail("rank").is_err());
        assert!(parse_detail("=2").is_err());
    }

    #[test]
    fn cli_verify() {
        Cli::command().debug_assert();
    }
}
