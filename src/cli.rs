//! Interface de linha de comando do stagegate baseada em clap.
//!
//! Define a struct [`Cli`] com subcomandos [`Command`] (next-step, ticket,
//! demo) e flags globais (--data-dir, --verbose).

use clap::{Parser, Subcommand};

/// stagegate — Governador determinístico de fluxo de tickets para agentes IA.
#[derive(Debug, Parser)]
#[command(name = "stagegate", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Diretório de dados, sobrepõe `stagegate.toml` e a variável de ambiente.
    #[arg(long, global = true)]
    pub data_dir: Option<String>,

    /// Habilita saída detalhada (verbose).
    #[arg(long, short, global = true, default_value_t = false)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Valida um documento de ticket e devolve o próximo passo do fluxo.
    NextStep {
        /// Caminho para o arquivo JSON do ticket; lê de stdin se omitido.
        #[arg(long)]
        file: Option<String>,
    },

    /// Mostra o último snapshot salvo de um ticket.
    Ticket {
        /// Identificador do ticket.
        ticket_id: String,
    },

    /// Runs the embedded governed dialog across every workflow stage.
    Demo,
}
