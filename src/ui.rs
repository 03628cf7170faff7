//! Saída de terminal do rentflow: texto colorido ou JSON.
//!
//! Usa a crate `console` para estilização com cores. O [`Printer`] decide
//! entre a forma legível e o JSON bruto conforme a flag `--json`.

use console::Style;
use serde::Serialize;

use rentflow::WorkflowError;
use rentflow::outbox::{OutboxItem, OutboxStatus};
use rentflow::workflow::{Agreement, Payload, State, ThreadItem};

pub struct Printer {
    json: bool,
    // Estilo verde para sucesso e estados vivos.
    green: Style,
    // Estilo vermelho para falhas e estados encerrados.
    red: Style,
    // Estilo amarelo para itens pendentes.
    yellow: Style,
    dim: Style,
}

impl Printer {
    pub fn new(json: bool) -> Self {
        Self {
            json,
            green: Style::new().green().bold(),
            red: Style::new().red().bold(),
            yellow: Style::new().yellow(),
            dim: Style::new().dim(),
        }
    }

    /// Imprime o contrato com o histórico completo.
    pub fn agreement(&self, a: &Agreement) {
        if self.print_json(a) {
            return;
        }
        println!(
            "{} {} [{}]",
            self.green.apply_to("●"),
            a.id,
            self.state_style(a.status).apply_to(a.status)
        );
        println!("  tenant: {}  landlord: {}", a.tenant_id, a.landlord_id);
        if let Some(number) = &a.contract_number {
            println!("  contract: {number}");
        }
        for entry in &a.history {
            let detail = match &entry.payload {
                Some(Payload::Note { text }) => format!(": {text}"),
                Some(Payload::ContractIssued { contract_number, .. }) => {
                    format!(": {contract_number}")
                }
                Some(Payload::Thread { text, .. }) => format!(": {text}"),
                None => String::new(),
            };
            println!(
                "  {} {} by {}{detail}",
                self.dim.apply_to(entry.timestamp.format("%Y-%m-%d %H:%M:%S")),
                entry.action,
                entry.actor
            );
        }
    }

    /// Imprime uma linha por contrato.
    pub fn agreements(&self, list: &[Agreement]) {
        if self.print_json(&list) {
            return;
        }
        for a in list {
            println!(
                "{:<16} {:<20} {}",
                a.id,
                self.state_style(a.status).apply_to(a.status),
                a.contract_number.as_deref().unwrap_or("-")
            );
        }
    }

    pub fn thread_item(&self, item: &ThreadItem) {
        if self.print_json(item) {
            return;
        }
        println!("  {} {}: {}", self.green.apply_to("✓"), item.author, item.text);
    }

    pub fn outbox(&self, items: &[OutboxItem]) {
        if self.print_json(&items) {
            return;
        }
        for item in items {
            let status = match item.status {
                OutboxStatus::Queued => self.yellow.apply_to(item.status),
                OutboxStatus::Sent => self.green.apply_to(item.status),
                OutboxStatus::Failed => self.red.apply_to(item.status),
            };
            println!(
                "{} {:<6} {} {:<8} {}",
                self.dim.apply_to(&item.id[..8.min(item.id.len())]),
                item.channel,
                item.to,
                status,
                item.text
            );
        }
    }

    /// Valores simples (números de série, contadores).
    pub fn value(&self, value: impl Serialize + std::fmt::Display) {
        if self.print_json(&value) {
            return;
        }
        println!("{value}");
    }

    /// Exibe o erro em vermelho com a classe de status correspondente.
    pub fn error(&self, err: &WorkflowError) {
        eprintln!(
            "  {} [{}] {err}",
            self.red.apply_to("✗"),
            err.status_code()
        );
    }

    fn state_style(&self, state: State) -> &Style {
        match state {
            State::Terminated | State::Expired | State::Cancelled => &self.red,
            State::Active | State::Renewed => &self.green,
            _ => &self.yellow,
        }
    }

    fn print_json<T: Serialize + ?Sized>(&self, value: &T) -> bool {
        if self.json {
            println!("{}", serde_json::to_string_pretty(value).unwrap_or_default());
        }
        self.json
    }
}
