//! Interface de terminal do stagegate — saída colorida das respostas.
//!
//! Usa a crate `console` para estilização com cores. O [`ResponsePrinter`]
//! mostra o veredito de cada chamada: verde para avanço, amarelo para
//! retentativa, vermelho para parada.

use console::Style;

use crate::gates::GateStatus;
use crate::orchestrator::NextStepResponse;

/// Impressora de respostas do orquestrador para o terminal.
pub struct ResponsePrinter {
    // Estilo verde para avanços.
    green: Style,
    // Estilo vermelho para paradas.
    red: Style,
    // Estilo amarelo para retentativas.
    yellow: Style,
}

impl Default for ResponsePrinter {
    fn default() -> Self {
        Self::new()
    }
}

impl ResponsePrinter {
    pub fn new() -> Self {
        Self {
            green: Style::new().green().bold(),
            red: Style::new().red().bold(),
            yellow: Style::new().yellow(),
        }
    }

    /// Exibe o veredito de uma resposta seguido do documento JSON completo.
    pub fn print(&self, response: &NextStepResponse) {
        if response.continue_ {
            let next = response
                .next_state
                .map(|state| state.to_string())
                .unwrap_or_default();
            println!("  {} advance to {next}", self.green.apply_to("✓"));
        } else if response.gate_result.status == GateStatus::Stop {
            println!("  {} stop: {}", self.red.apply_to("✗"), response.reason);
        } else if response.gate_result.status == GateStatus::Retry {
            println!("  {} retry: {}", self.yellow.apply_to("↻"), response.reason);
        } else {
            // Gate passou mas a transição encerrou a execução.
            println!("  {} {}", self.green.apply_to("✓"), response.reason);
        }

        println!(
            "{}",
            serde_json::to_string_pretty(response).unwrap_or_default()
        );
    }
}
