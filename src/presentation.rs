//! Server-rendered vote widget.
//!
//! `WidgetState` is the per-widget state machine; the browser script in
//! `assets/like-or-bad.js` walks the same transitions after the page loads.

use std::fmt::Write;

use crate::models::{VoteCounters, VoteKind, VoteSettings};

pub const DISABLED_TITLE: &str = "You have already voted on this item";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidgetState {
    Idle { enabled: bool },
    Voting,
    Voted { kind: VoteKind },
    Failed,
}

impl WidgetState {
    /// Initial state for a page render, given the voter's active marker.
    pub fn initial(marker: Option<VoteKind>) -> Self {
        match marker {
            Some(kind) => WidgetState::Voted { kind },
            None => WidgetState::Idle { enabled: true },
        }
    }

    pub fn activate(self) -> Self {
        match self {
            WidgetState::Idle { enabled: true } => WidgetState::Voting,
            other => other,
        }
    }

    pub fn succeed(self, kind: VoteKind) -> Self {
        match self {
            WidgetState::Voting => WidgetState::Voted { kind },
            other => other,
        }
    }

    pub fn fail(self) -> Self {
        match self {
            WidgetState::Voting => WidgetState::Failed,
            other => other,
        }
    }

    pub fn settle(self) -> Self {
        match self {
            WidgetState::Failed => WidgetState::Idle { enabled: true },
            other => other,
        }
    }

    pub fn controls_disabled(&self) -> bool {
        !matches!(self, WidgetState::Idle { enabled: true } | WidgetState::Failed)
    }

    pub fn voted_kind(&self) -> Option<VoteKind> {
        match self {
            WidgetState::Voted { kind } => Some(*kind),
            _ => None,
        }
    }
}

pub struct WidgetView<'a> {
    pub item_id: i64,
    pub counters: VoteCounters,
    pub state: WidgetState,
    pub settings: &'a VoteSettings,
    pub token: &'a str,
    pub endpoint: &'a str,
}

pub fn render_widget(view: &WidgetView<'_>) -> String {
    let voted = view.state.voted_kind();
    let disabled = view.state.controls_disabled();

    let mut wrap_classes = vec!["lob".to_string()];
    if disabled {
        wrap_classes.push("lob-disabled".to_string());
    }
    if let Some(kind) = voted {
        wrap_classes.push("lob-voted".to_string());
        wrap_classes.push(format!("lob-voted-{}", kind));
    }

    let mut html = String::new();
    let _ = write!(
        html,
        r#"<div class="{}" data-item-id="{}" data-nonce="{}" data-endpoint="{}" data-thank-you="{}">"#,
        escape_html(&wrap_classes.join(" ")),
        view.item_id,
        escape_html(view.token),
        escape_html(view.endpoint),
        escape_html(&view.settings.thank_you_message),
    );

    for (kind, label) in [
        (VoteKind::Like, view.settings.label_like.as_str()),
        (VoteKind::Bad, view.settings.label_bad.as_str()),
    ] {
        render_button(&mut html, view, kind, label, disabled, voted == Some(kind));
    }

    html.push_str(r#"<p class="lob-thanks" aria-live="polite" hidden></p>"#);
    html.push_str("</div>");
    html
}

fn render_button(
    html: &mut String,
    view: &WidgetView<'_>,
    kind: VoteKind,
    label: &str,
    disabled: bool,
    voted: bool,
) {
    let mut classes = format!("lob-btn lob-{}", kind);
    if voted {
        classes.push_str(" lob-btn-voted");
    }
    let title = if disabled { DISABLED_TITLE } else { "" };

    let _ = write!(
        html,
        r#"<button type="button" class="{}" data-kind="{}" aria-disabled="{}" title="{}"{}>"#,
        classes,
        kind,
        disabled,
        title,
        if disabled { r#" disabled="disabled""# } else { "" },
    );
    let _ = write!(
        html,
        r#"<span class="lob-label">{}</span><span class="lob-count" aria-live="polite">{}</span></button>"#,
        escape_html(label),
        view.counters.count(kind),
    );
}

pub fn escape_html(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
