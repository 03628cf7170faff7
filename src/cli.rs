//! Interface de linha de comando do rentflow baseada em clap.
//!
//! Define a struct [`Cli`] com subcomandos [`Command`] (create, transition,
//! serial, thread, enqueue, outbox...) e flags globais (--store, --json, --verbose).

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use rentflow::outbox::OutboxStatus;
use rentflow::workflow::AgreementKind;

/// rentflow: ciclo de vida de contratos de locação do portal administrativo.
#[derive(Debug, Parser)]
#[command(name = "rentflow", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Caminho do documento JSON (sobrepõe `rentflow.toml` e `RENTFLOW_STORE`).
    #[arg(long, global = true)]
    pub store: Option<PathBuf>,

    /// Imprime o resultado como JSON em vez de texto formatado.
    #[arg(long, global = true, default_value_t = false)]
    pub json: bool,

    /// Habilita saída detalhada (verbose).
    #[arg(long, short, global = true, default_value_t = false)]
    pub verbose: bool,
}

/// Tipo de registro aceito pela CLI, mapeado para [`AgreementKind`].
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum KindArg {
    Rental,
    Contract,
    Task,
}

impl From<KindArg> for AgreementKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Rental => AgreementKind::Rental,
            KindArg::Contract => AgreementKind::Contract,
            KindArg::Task => AgreementKind::Task,
        }
    }
}

/// Resultado de entrega informado por um worker externo.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum DeliveryArg {
    Sent,
    Failed,
}

impl From<DeliveryArg> for OutboxStatus {
    fn from(arg: DeliveryArg) -> Self {
        match arg {
            DeliveryArg::Sent => OutboxStatus::Sent,
            DeliveryArg::Failed => OutboxStatus::Failed,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Registra um novo contrato em rascunho.
    Create {
        /// Identificador do contrato (ex.: RNT-1); gerado se omitido.
        #[arg(long)]
        id: Option<String>,

        #[arg(long, value_enum, default_value = "rental")]
        kind: KindArg,

        #[arg(long)]
        tenant: String,

        #[arg(long)]
        landlord: String,

        #[arg(long)]
        property: Option<String>,

        /// Endereço para notificações ao inquilino.
        #[arg(long)]
        contact: Option<String>,
    },

    /// Mostra um contrato com seu histórico.
    Show { id: String },

    /// Lista todos os contratos.
    List,

    /// Aplica um evento ao contrato.
    Transition {
        id: String,

        /// generate_contract, sign, activate, renew, terminate, expire ou cancel.
        event: String,

        #[arg(long)]
        actor: Option<String>,

        #[arg(long)]
        note: Option<String>,
    },

    /// Operações de numeração sequencial.
    Serial {
        #[command(subcommand)]
        action: SerialAction,
    },

    /// Adiciona um comentário ao histórico do contrato.
    Thread {
        id: String,
        text: String,

        #[arg(long)]
        author: Option<String>,
    },

    /// Enfileira uma notificação no outbox.
    Enqueue {
        #[arg(long)]
        channel: String,

        #[arg(long)]
        to: String,

        #[arg(long)]
        subject: Option<String>,

        #[arg(long)]
        task: Option<String>,

        text: String,
    },

    /// Lista as notificações mais recentes.
    Outbox {
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },

    /// Registra o resultado de entrega de uma notificação.
    Mark {
        id: String,

        #[arg(value_enum)]
        status: DeliveryArg,

        #[arg(long)]
        error: Option<String>,
    },
}

#[derive(Debug, Subcommand)]
pub enum SerialAction {
    /// Emite o próximo número do prefixo.
    Next { prefix: String },
    /// Mostra o número atual sem incrementar.
    Peek { prefix: String },
    /// Redefine o contador (não verifica monotonicidade).
    Reset { prefix: String, value: u64 },
}
