//! Interface de terminal do laurel com saída colorida.
//!
//! Usa a crate `console` para estilização com cores. O [`Terminal`] exibe
//! conquistas, histórico, a tabela de transições e erros. A formatação das
//! linhas fica em funções livres para poder ser testada sem um tty.

use console::Style;

use crate::error::LifecycleError;
use crate::lifecycle::{
    AchievementType, AchievementView, Action, Details, StateMachine, Status, StatusHistoryEntry,
    Transition, Warning,
};
use crate::stats::Statistics;

/// Impressora estilizada para a saída da CLI.
///
/// Cada status tem sua cor: rascunho esmaecido, submetido em ciano,
/// verificado em verde e rejeitado em vermelho.
pub struct Terminal {
    green: Style,
    red: Style,
    yellow: Style,
    cyan: Style,
    dim: Style,
    bold: Style,
}

impl Default for Terminal {
    fn default() -> Self {
        Self::new()
    }
}

impl Terminal {
    pub fn new() -> Self {
        Self {
            green: Style::new().green().bold(),
            red: Style::new().red().bold(),
            yellow: Style::new().yellow(),
            cyan: Style::new().cyan(),
            dim: Style::new().dim(),
            bold: Style::new().bold(),
        }
    }

    fn status_style(&self, status: Status) -> &Style {
        match status {
            Status::Draft => &self.dim,
            Status::Submitted => &self.cyan,
            Status::Verified => &self.green,
            Status::Rejected => &self.red,
        }
    }

    pub fn heading(&self, text: &str) {
        println!();
        println!("{}", self.bold.apply_to(format!("─── {text} ───")));
    }

    /// Imprime uma conquista com status, tipo, título e pontos.
    pub fn print_view(&self, view: &AchievementView) {
        println!(
            "  {} [{}] {} ({} pts)",
            self.status_style(view.status)
                .apply_to(format!("{:<9}", view.status)),
            view.achievement_type,
            view.title,
            view.points
        );
        if let Some(name) = &view.student_name {
            println!("    {}", self.dim.apply_to(format!("owner: {name}")));
        }
        if let Some(note) = &view.rejection_note {
            println!("    {}", self.red.apply_to(format!("rejected: {note}")));
        }
    }

    /// Imprime o histórico de status, do mais antigo ao mais recente.
    pub fn print_history(&self, entries: &[StatusHistoryEntry]) {
        for entry in entries {
            println!("  {}", self.dim.apply_to(history_line(entry)));
        }
    }

    pub fn print_warnings(&self, warnings: &[Warning]) {
        for warning in warnings {
            println!("  {} {}", self.yellow.apply_to("!"), warning_line(warning));
        }
    }

    /// Exibe uma falha esperada, como um cenário que deve ser recusado.
    pub fn expected_error(&self, error: &LifecycleError) {
        println!(
            "  {} refused ({}): {error}",
            self.green.apply_to("✓"),
            error.kind()
        );
    }

    pub fn success(&self, message: &str) {
        println!("  {} {message}", self.green.apply_to("✓"));
    }

    pub fn print_score(&self, achievement_type: AchievementType, details: &Details, points: u32) {
        println!(
            "{} {}",
            self.bold.apply_to(achievement_type),
            self.dim.apply_to(serde_json::to_string(details).unwrap_or_default())
        );
        println!("{} points", self.green.apply_to(points));
    }

    /// Imprime a tabela de transições da máquina de estados.
    pub fn print_transitions(&self) {
        for (status, action, transition) in StateMachine::edges() {
            println!(
                "  {} {}",
                self.status_style(status).apply_to(format!("{status:<9}")),
                transition_line(action, transition)
            );
        }
    }

    pub fn print_statistics(&self, stats: &Statistics) {
        println!(
            "  total {}  draft {}  submitted {}  verified {}  rejected {}",
            stats.total, stats.draft, stats.submitted, stats.verified, stats.rejected
        );
        for top in &stats.top_students {
            println!(
                "  {} {} pts over {} achievement(s)",
                self.cyan
                    .apply_to(top.full_name.as_deref().unwrap_or("unknown student")),
                top.total_points,
                top.achievements
            );
        }
        if stats.degraded {
            println!("  {}", self.yellow.apply_to("some figures unavailable"));
        }
    }
}

pub fn history_line(entry: &StatusHistoryEntry) -> String {
    let from = entry
        .old_status
        .map_or_else(|| "∅".to_string(), |s| s.to_string());
    let mut line = format!(
        "{} {from} → {}",
        entry.timestamp.format("%Y-%m-%d %H:%M:%S"),
        entry.new_status
    );
    if let Some(note) = &entry.note {
        line.push_str(&format!(" ({note})"));
    }
    line
}

pub fn transition_line(action: Action, transition: Transition) -> String {
    match transition {
        Transition::Move { to, .. } => format!("--{action}--> {to}"),
        Transition::Stay(status) => format!("--{action}--> {status} (unchanged)"),
        Transition::Remove => format!("--{action}--> removed"),
    }
}

pub fn warning_line(warning: &Warning) -> String {
    match warning {
        Warning::HistoryNotRecorded {
            reference_id,
            to,
            reason,
            ..
        } => format!("history for {reference_id} (→ {to}) not recorded: {reason}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::{ReferenceId, UserId};

    #[test]
    fn history_line_shows_creation_and_note() {
        let entry = StatusHistoryEntry::record(
            ReferenceId::new(),
            None,
            Status::Draft,
            UserId::new(),
            Some("created".into()),
        );
        let line = history_line(&entry);
        assert!(line.ends_with("∅ → draft (created)"), "{line}");

        let entry = StatusHistoryEntry::record(
            ReferenceId::new(),
            Some(Status::Submitted),
            Status::Rejected,
            UserId::new(),
            None,
        );
        assert!(history_line(&entry).ends_with("submitted → rejected"));
    }

    #[test]
    fn transition_lines() {
        assert_eq!(
            transition_line(
                Action::Submit,
                Transition::Move {
                    from: Status::Draft,
                    to: Status::Submitted
                }
            ),
            "--submit--> submitted"
        );
        assert_eq!(
            transition_line(Action::Edit, Transition::Stay(Status::Draft)),
            "--edit--> draft (unchanged)"
        );
        assert_eq!(
            transition_line(Action::Delete, Transition::Remove),
            "--delete--> removed"
        );
    }

    #[test]
    fn warning_line_names_target_status() {
        let id = ReferenceId::new();
        let line = warning_line(&Warning::HistoryNotRecorded {
            reference_id: id,
            from: Some(Status::Draft),
            to: Status::Submitted,
            reason: "store unavailable".into(),
        });
        assert_eq!(
            line,
            format!("history for {id} (→ submitted) not recorded: store unavailable")
        );
    }
}
