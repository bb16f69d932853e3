//! Terminal rendering of controller state.

use client::{
    CountStatus, DeletionState, FieldErrors, HomeView, MetricsBoard, Notification,
    NotificationSink, ReloadReason, ReloadSignal, SessionState,
};
use colored::Colorize;
use shared::models::UserProfile;

/// Prints notifications as colored lines; errors go to stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleNotifier;

impl NotificationSink for ConsoleNotifier {
    fn notify(&self, notification: Notification) {
        match notification {
            Notification::Success(message) => println!("{}", message.green().bold()),
            Notification::Error(message) => eprintln!("{}", message.red().bold()),
        }
    }
}

pub fn render_home(state: SessionState, board: &MetricsBoard) {
    match state.view() {
        HomeView::Loading => println!("{}", "Signing in...".dimmed()),
        HomeView::LoginRequired => {
            println!("{}", "Not signed in.".yellow());
            println!("Run `fabricator home` to sign in with the fallback account.");
        }
        HomeView::InitializePrompt => {
            render_records(board);
            println!();
            println!(
                "{} run `fabricator initialize` to generate demo users and items.",
                "Not initialized:".yellow().bold()
            );
        }
        HomeView::Shop => {
            render_records(board);
            println!();
            println!("{} {}", "Shop is ready:".green().bold(), client::Route::Shop);
        }
    }
}

fn render_records(board: &MetricsBoard) {
    println!("{}", "Database records".bold());
    println!("{:<8} {:>10} {:>10} {:>10}", "", "generated", "defined", "all");
    for row in board.rows() {
        println!(
            "{:<8} {:>10} {:>10} {:>10}",
            row.entity.collection(),
            cell(row.generated),
            cell(row.defined),
            cell(row.all)
        );
    }
    println!(
        "{}",
        "generated: created by initialize; defined: created by users".dimmed()
    );
}

fn cell(status: CountStatus) -> String {
    match status {
        CountStatus::Ready(value) => value.to_string(),
        CountStatus::Pending => "...".to_string(),
        CountStatus::Unavailable => "?".to_string(),
    }
}

pub fn render_reload(signal: ReloadSignal) {
    let reason = match signal.reason {
        ReloadReason::LoggedIn => "signed in",
        ReloadReason::Initialized => "initialized",
    };
    println!(
        "{}",
        format!("{reason}; reloading after {}ms", signal.delay.as_millis()).dimmed()
    );
}

pub fn render_profile(profile: &UserProfile) {
    println!("{}", "Profile".bold());
    println!("ID: {}", profile.id);
    println!("Username: {}", profile.username);
    println!("Email: {}", profile.email);
}

pub fn render_account(state: &DeletionState) {
    match state {
        DeletionState::Viewing(view) => match &view.profile {
            Some(profile) => render_profile(profile),
            None => println!("{}", "Profile unavailable.".yellow()),
        },
        DeletionState::Loading | DeletionState::Submitting => {
            println!("{}", "Loading...".dimmed());
        }
        DeletionState::Deleted | DeletionState::Unauthenticated => {}
    }
    if let Some(route) = state.redirect() {
        println!("{} {route}", "Redirecting to".yellow());
    }
}

pub fn render_field_errors(errors: &FieldErrors) {
    for (field, message) in errors.messages() {
        eprintln!("{} {}", format!("{field}:").red(), message);
    }
}
