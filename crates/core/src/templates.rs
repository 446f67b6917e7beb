//! Notification email rendering.
//!
//! Maps a notification type plus a small user context to a subject line and a
//! self-contained HTML body. The markup is table-based with fully inlined
//! styles because the target readers are unpredictable mail clients; nothing
//! references an external stylesheet or script.
//!
//! Rendering is pure: the daily prompt is chosen through the injectable
//! [`PromptPicker`] seam so tests can pin the output byte-for-byte.

use serde::{Deserialize, Serialize};

use crate::streak::{fallback_title, milestone_for};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// The three notification email variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmailKind {
    DailyReminder,
    WeeklySummary,
    StreakMilestone,
}

impl EmailKind {
    /// Wire name as stored in the `notification_jobs.job_type` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            EmailKind::DailyReminder => "daily_reminder",
            EmailKind::WeeklySummary => "weekly_summary",
            EmailKind::StreakMilestone => "streak_milestone",
        }
    }

    /// Parse the wire name back into a kind.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "daily_reminder" => Some(EmailKind::DailyReminder),
            "weekly_summary" => Some(EmailKind::WeeklySummary),
            "streak_milestone" => Some(EmailKind::StreakMilestone),
            _ => None,
        }
    }
}

/// Per-user context interpolated into the templates.
#[derive(Debug, Clone)]
pub struct EmailContext {
    /// User-supplied display name. Escaped before interpolation.
    pub display_name: String,
    pub current_streak: u32,
    pub total_entries: u32,
    /// Base URL of the web app, without trailing slash.
    pub app_url: String,
}

/// A rendered email ready for the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedEmail {
    pub subject: String,
    pub html: String,
}

// ---------------------------------------------------------------------------
// Prompt selection
// ---------------------------------------------------------------------------

/// Writing prompts for the daily reminder. One is chosen per email.
pub const DAILY_PROMPTS: [&str; 12] = [
    "What made you smile today?",
    "Describe a moment you want to remember from this week.",
    "What is one thing you learned recently?",
    "Who had a positive impact on your day, and how?",
    "What would you tell your past self from one year ago?",
    "What are you grateful for right now?",
    "Describe a challenge you are facing and one small step forward.",
    "What does your ideal tomorrow look like?",
    "Which habit is serving you well, and which is not?",
    "Write about a place where you feel completely at ease.",
    "What surprised you today?",
    "If today had a title, what would it be and why?",
];

/// Source of the daily prompt choice.
///
/// The production implementation draws from a thread-local RNG; tests inject
/// a fixed index so rendered output is deterministic.
pub trait PromptPicker {
    /// Return an index in `0..len`. `len` is always `>= 1`.
    fn pick(&mut self, len: usize) -> usize;
}

/// Rand-backed picker used in production.
#[derive(Debug, Default)]
pub struct RandomPromptPicker;

impl PromptPicker for RandomPromptPicker {
    fn pick(&mut self, len: usize) -> usize {
        use rand::Rng;
        rand::rng().random_range(0..len)
    }
}

/// Always picks the same index. Test seam.
#[derive(Debug, Clone, Copy)]
pub struct FixedPromptPicker(pub usize);

impl PromptPicker for FixedPromptPicker {
    fn pick(&mut self, len: usize) -> usize {
        self.0 % len
    }
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

/// Escape user-supplied text for interpolation into HTML.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Render the email for `kind` with the given context.
pub fn render(
    kind: EmailKind,
    ctx: &EmailContext,
    prompts: &mut dyn PromptPicker,
) -> RenderedEmail {
    match kind {
        EmailKind::DailyReminder => render_daily_reminder(ctx, prompts),
        EmailKind::WeeklySummary => render_weekly_summary(ctx),
        EmailKind::StreakMilestone => render_streak_milestone(ctx),
    }
}

/// Shared outer shell: centered 600px table on a neutral background.
fn shell(inner: &str) -> String {
    format!(
        r#"<!DOCTYPE html><html><body style="margin:0;padding:0;background-color:#f4f1ec;font-family:Georgia,'Times New Roman',serif;">
<table role="presentation" width="100%" cellpadding="0" cellspacing="0" style="background-color:#f4f1ec;padding:24px 0;"><tr><td align="center">
<table role="presentation" width="600" cellpadding="0" cellspacing="0" style="background-color:#ffffff;border-radius:8px;overflow:hidden;">
{inner}
<tr><td style="padding:16px 32px;background-color:#faf8f5;border-top:1px solid #e8e2d8;">
<p style="margin:0;font-size:12px;color:#9a8f7e;">You are receiving this because email reminders are enabled in your Daybook settings.</p>
</td></tr>
</table>
</td></tr></table>
</body></html>"#
    )
}

/// A full-width call-to-action button row.
fn cta_button(href: &str, label: &str) -> String {
    format!(
        r#"<tr><td align="center" style="padding:8px 32px 28px;">
<a href="{href}" style="display:inline-block;padding:12px 28px;background-color:#6b5d4f;color:#ffffff;text-decoration:none;border-radius:6px;font-size:15px;">{label}</a>
</td></tr>"#
    )
}

fn render_daily_reminder(ctx: &EmailContext, prompts: &mut dyn PromptPicker) -> RenderedEmail {
    let name = escape_html(&ctx.display_name);
    let prompt = DAILY_PROMPTS[prompts.pick(DAILY_PROMPTS.len())];

    // The streak callout only appears for users with a live streak; a zero
    // streak would read as a reproach rather than encouragement.
    let streak_block = if ctx.current_streak > 0 {
        format!(
            r#"<tr><td style="padding:0 32px 16px;">
<table role="presentation" width="100%" cellpadding="0" cellspacing="0" style="background-color:#f0ebe2;border-radius:6px;"><tr><td style="padding:14px 18px;">
<p style="margin:0;font-size:14px;color:#6b5d4f;">&#128293; You're on a <strong>{} day streak</strong>. Keep it alive!</p>
</td></tr></table>
</td></tr>"#,
            ctx.current_streak
        )
    } else {
        String::new()
    };

    let inner = format!(
        r#"<tr><td style="padding:32px 32px 8px;">
<h1 style="margin:0 0 12px;font-size:22px;color:#3d362e;">Time to write, {name}</h1>
<p style="margin:0 0 16px;font-size:15px;color:#5c5347;line-height:1.6;">A few quiet minutes with your journal is all it takes. Here's something to get you started:</p>
</td></tr>
<tr><td style="padding:0 32px 16px;">
<table role="presentation" width="100%" cellpadding="0" cellspacing="0" style="border-left:4px solid #b5a88f;background-color:#faf8f5;"><tr><td style="padding:14px 18px;">
<p style="margin:0;font-size:16px;font-style:italic;color:#5c5347;">{prompt}</p>
</td></tr></table>
</td></tr>
{streak_block}
{cta}"#,
        cta = cta_button(&format!("{}/entries/new", ctx.app_url), "Write today's entry"),
    );

    RenderedEmail {
        subject: "Your journal is waiting \u{270D}\u{FE0F}".to_string(),
        html: shell(&inner),
    }
}

fn render_weekly_summary(ctx: &EmailContext) -> RenderedEmail {
    let name = escape_html(&ctx.display_name);

    let banner = if ctx.current_streak >= 7 {
        format!(
            r#"<p style="margin:0 0 16px;font-size:15px;color:#7a6a2f;background-color:#f5efd8;border-radius:6px;padding:12px 16px;">&#127881; Amazing consistency — a {} day streak and counting!</p>"#,
            ctx.current_streak
        )
    } else {
        r#"<p style="margin:0 0 16px;font-size:15px;color:#5c5347;background-color:#faf8f5;border-radius:6px;padding:12px 16px;">Tip: writing at the same time each day is the easiest way to build a streak.</p>"#.to_string()
    };

    let inner = format!(
        r#"<tr><td style="padding:32px 32px 8px;">
<h1 style="margin:0 0 12px;font-size:22px;color:#3d362e;">Your week in review, {name}</h1>
</td></tr>
<tr><td style="padding:0 32px 16px;">
<table role="presentation" width="100%" cellpadding="0" cellspacing="0"><tr>
<td width="50%" align="center" style="padding:18px;background-color:#faf8f5;border-radius:6px;">
<p style="margin:0;font-size:28px;font-weight:bold;color:#3d362e;">{total}</p>
<p style="margin:4px 0 0;font-size:13px;color:#9a8f7e;">total entries</p>
</td>
<td width="8">&nbsp;</td>
<td width="50%" align="center" style="padding:18px;background-color:#faf8f5;border-radius:6px;">
<p style="margin:0;font-size:28px;font-weight:bold;color:#3d362e;">{streak}</p>
<p style="margin:4px 0 0;font-size:13px;color:#9a8f7e;">day streak</p>
</td>
</tr></table>
</td></tr>
<tr><td style="padding:0 32px 0;">{banner}</td></tr>
{cta_calendar}
{cta_write}"#,
        total = ctx.total_entries,
        streak = ctx.current_streak,
        cta_calendar = cta_button(&format!("{}/calendar", ctx.app_url), "See your week"),
        cta_write = cta_button(&format!("{}/entries/new", ctx.app_url), "Start a new entry"),
    );

    RenderedEmail {
        subject: "Your weekly journaling summary".to_string(),
        html: shell(&inner),
    }
}

fn render_streak_milestone(ctx: &EmailContext) -> RenderedEmail {
    let name = escape_html(&ctx.display_name);

    let (title, message) = match milestone_for(ctx.current_streak) {
        Some(m) => (m.title.to_string(), m.message.to_string()),
        None => (
            fallback_title(ctx.current_streak),
            format!(
                "{} consecutive days of journaling. Every day you show up, the habit grows stronger.",
                ctx.current_streak
            ),
        ),
    };

    let inner = format!(
        r#"<tr><td align="center" style="padding:36px 32px 8px;">
<p style="margin:0;font-size:44px;">&#127942;</p>
<h1 style="margin:12px 0;font-size:24px;color:#3d362e;">{title}</h1>
<p style="margin:0 0 8px;font-size:15px;color:#5c5347;line-height:1.6;">Congratulations, {name}!</p>
<p style="margin:0 0 20px;font-size:15px;color:#5c5347;line-height:1.6;">{message}</p>
</td></tr>
{cta}"#,
        cta = cta_button(&format!("{}/entries/new", ctx.app_url), "Keep the streak going"),
    );

    RenderedEmail {
        subject: format!("\u{1F3C6} {title}"),
        html: shell(&inner),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(streak: u32) -> EmailContext {
        EmailContext {
            display_name: "Ada".to_string(),
            current_streak: streak,
            total_entries: 120,
            app_url: "https://daybook.example".to_string(),
        }
    }

    #[test]
    fn email_kind_round_trips_through_wire_name() {
        for kind in [
            EmailKind::DailyReminder,
            EmailKind::WeeklySummary,
            EmailKind::StreakMilestone,
        ] {
            assert_eq!(EmailKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(EmailKind::parse("push_notification"), None);
    }

    #[test]
    fn daily_reminder_is_deterministic_with_fixed_picker() {
        let a = render(EmailKind::DailyReminder, &ctx(3), &mut FixedPromptPicker(4));
        let b = render(EmailKind::DailyReminder, &ctx(3), &mut FixedPromptPicker(4));
        assert_eq!(a, b);
        assert!(a.html.contains(DAILY_PROMPTS[4]));
    }

    #[test]
    fn daily_reminder_includes_streak_callout_only_when_positive() {
        let with = render(EmailKind::DailyReminder, &ctx(5), &mut FixedPromptPicker(0));
        assert!(with.html.contains("5 day streak"));

        let without = render(EmailKind::DailyReminder, &ctx(0), &mut FixedPromptPicker(0));
        assert!(!without.html.contains("day streak"));
    }

    #[test]
    fn daily_reminder_links_to_entry_composition() {
        let email = render(EmailKind::DailyReminder, &ctx(0), &mut FixedPromptPicker(0));
        assert!(email.html.contains("https://daybook.example/entries/new"));
    }

    #[test]
    fn weekly_summary_shows_both_stats_and_two_ctas() {
        let email = render(EmailKind::WeeklySummary, &ctx(2), &mut FixedPromptPicker(0));
        assert!(email.html.contains(">120<"));
        assert!(email.html.contains(">2<"));
        assert!(email.html.contains("/calendar"));
        assert!(email.html.contains("/entries/new"));
    }

    #[test]
    fn weekly_summary_banner_celebrates_at_seven_days() {
        let celebrating = render(EmailKind::WeeklySummary, &ctx(7), &mut FixedPromptPicker(0));
        assert!(celebrating.html.contains("Amazing consistency"));

        let tip = render(EmailKind::WeeklySummary, &ctx(6), &mut FixedPromptPicker(0));
        assert!(tip.html.contains("Tip:"));
        assert!(!tip.html.contains("Amazing consistency"));
    }

    #[test]
    fn milestone_email_uses_exact_copy_for_table_entries() {
        let email = render(EmailKind::StreakMilestone, &ctx(30), &mut FixedPromptPicker(0));
        assert!(email.subject.contains("30-Day Habit Master!"));
        assert!(email.html.contains("30-Day Habit Master!"));
    }

    #[test]
    fn milestone_email_falls_back_for_off_table_lengths() {
        let email = render(EmailKind::StreakMilestone, &ctx(42), &mut FixedPromptPicker(0));
        assert!(email.subject.contains("42-Day Streak!"));
        assert!(email.html.contains("42 consecutive days"));
    }

    #[test]
    fn display_name_is_escaped() {
        let hostile = EmailContext {
            display_name: r#"<script>alert("x")</script>"#.to_string(),
            current_streak: 1,
            total_entries: 1,
            app_url: "https://daybook.example".to_string(),
        };
        for kind in [
            EmailKind::DailyReminder,
            EmailKind::WeeklySummary,
            EmailKind::StreakMilestone,
        ] {
            let email = render(kind, &hostile, &mut FixedPromptPicker(0));
            assert!(!email.html.contains("<script>"));
            assert!(email.html.contains("&lt;script&gt;"));
        }
    }

    #[test]
    fn markup_is_self_contained() {
        let email = render(EmailKind::WeeklySummary, &ctx(7), &mut FixedPromptPicker(0));
        assert!(!email.html.contains("<link"));
        assert!(!email.html.contains("stylesheet"));
        assert!(!email.html.contains("<script"));
    }

    #[test]
    fn prompt_list_has_at_least_ten_entries() {
        assert!(DAILY_PROMPTS.len() >= 10);
    }

    #[test]
    fn random_picker_stays_in_bounds() {
        let mut picker = RandomPromptPicker;
        for _ in 0..100 {
            assert!(picker.pick(DAILY_PROMPTS.len()) < DAILY_PROMPTS.len());
        }
    }
}
