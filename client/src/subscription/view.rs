use std::fmt;

use super::tiers::TierUnit;
use crate::model::Period;

/// What the presentation layer should draw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubscriptionView {
    SignedOut,
    Active(ActiveCard),
    Choose(TierForm),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveCard {
    pub grant_id: String,
    pub tier_index: usize,
    pub tier_label: String,
    pub amount: String,
    pub symbol: String,
    pub period: Period,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TierOption {
    pub unit: TierUnit,
    pub label: String,
    pub amount: String,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TierForm {
    pub options: Vec<TierOption>,
    pub symbol: String,
    /// Permissions have not been fetched yet.
    pub loading: bool,
    pub submit_disabled: bool,
    pub submit_label: &'static str,
}

impl TierForm {
    pub fn selected(&self) -> Option<&TierOption> {
        self.options.iter().find(|option| option.selected)
    }
}

impl fmt::Display for SubscriptionView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubscriptionView::SignedOut => writeln!(f, "Sign in to try"),
            SubscriptionView::Active(card) => {
                writeln!(f, "Your subscriptions")?;
                writeln!(f, "  {}  {} {}", card.tier_label, card.amount, card.symbol)?;
                writeln!(f, "  each {}", card.period)
            }
            SubscriptionView::Choose(form) => {
                if form.loading {
                    writeln!(f, "(loading permissions)")?;
                }
                for option in &form.options {
                    let mark = if option.selected { "(*)" } else { "( )" };
                    writeln!(
                        f,
                        "{mark} {}  {} {} per {}",
                        option.label, option.amount, form.symbol, option.unit
                    )?;
                }
                let state = if form.submit_disabled { " (disabled)" } else { "" };
                writeln!(f, "[{}]{state}", form.submit_label)
            }
        }
    }
}
