use anyhow::{Context, Result};
use clap::Parser;

use prweave::avatar::{
    backfill_commit_emails, resolve_timeline_avatars, HttpAvatarResolver, MemoCache,
};
use prweave::github::client::GitHubClient;
use prweave::github::convert::pull_request_from_rest;
use prweave::github::models::TimelineEvent;
use prweave::settings::Settings;
use prweave::{auth, insert_new_commits_since_review, normalize_timeline, reviewer_states};

#[derive(Parser, Debug)]
#[command(name = "prweave")]
#[command(about = "Reconcile a GitHub PR's event feeds into one canonical timeline", long_about = None)]
struct Cli {
    /// GitHub PR URL or PR number (e.g., https://github.com/owner/repo/pull/123 or 123)
    pr: String,

    /// GitHub personal access token (can also be set via GITHUB_TOKEN env var)
    #[arg(short, long)]
    token: Option<String>,

    /// Repository owner (required if using PR number instead of URL)
    #[arg(short, long)]
    owner: Option<String>,

    /// Repository name (required if using PR number instead of URL)
    #[arg(short, long)]
    repo: Option<String>,

    /// Emit the canonical timeline as JSON instead of a text summary
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();
    let settings = Settings::load().context("Failed to load settings")?;

    let token = auth::get_github_token(cli.token).context("Failed to get GitHub token")?;
    if token.is_none() {
        eprintln!("Warning: No GitHub token found. You may encounter rate limits.");
        eprintln!("Please provide authentication using one of these methods:");
        eprintln!("  1. Command line: --token YOUR_TOKEN");
        eprintln!(
            "  2. ~/.authinfo file: machine api.github.com login USERNAME^prweave password TOKEN"
        );
        eprintln!("  3. Environment variable: export GITHUB_TOKEN=YOUR_TOKEN");
    }

    if let Some(owner) = cli.owner {
        std::env::set_var("GITHUB_OWNER", owner);
    }
    if let Some(repo) = cli.repo {
        std::env::set_var("GITHUB_REPO", repo);
    }

    let parsed = GitHubClient::parse_pr_url(&cli.pr)?;
    let client = GitHubClient::new(token, &settings.github_host)
        .context("Failed to initialize client")?;

    let raw_pr = client
        .fetch_pull_request(&parsed.owner, &parsed.repo, parsed.number)
        .await
        .context("Failed to fetch pull request")?;
    let pull_request = pull_request_from_rest(&raw_pr);

    let page = client
        .fetch_timeline(&parsed.owner, &parsed.repo, parsed.number)
        .await
        .context("Failed to fetch timeline")?;

    let mut timeline = normalize_timeline(&page.events);

    let current_login = settings
        .current_login
        .clone()
        .or(page.viewer_login.clone());
    if let Some(login) = &current_login {
        timeline = insert_new_commits_since_review(
            &timeline,
            page.viewer_latest_review_commit.as_deref(),
            login,
            pull_request.head.as_ref(),
        );
    }

    if settings.backfill_emails {
        let cache = MemoCache::new();
        backfill_commit_emails(&mut timeline, &client, &cache).await;
    }

    if settings.resolve_avatars {
        let resolver = HttpAvatarResolver::new();
        let cache = MemoCache::new();
        resolve_timeline_avatars(&mut timeline, &resolver, &cache).await;
    }

    let states = reviewer_states(
        &pull_request.requested_reviewers,
        &timeline,
        &pull_request.author,
    );

    if cli.json {
        let output = serde_json::json!({
            "pull_request": pull_request,
            "timeline": timeline,
            "reviewer_states": states,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!(
        "#{} {} ({:?})",
        pull_request.number, pull_request.title, pull_request.state
    );
    if let Some(mergeability) = pull_request.mergeability {
        println!("mergeability: {mergeability:?}");
    }
    println!();

    for event in &timeline {
        println!("{}", describe(event));
    }

    if !states.is_empty() {
        println!();
        println!("reviewers:");
        for state in &states {
            println!("  {} - {:?}", state.reviewer.display_label(), state.state);
        }
    }

    Ok(())
}

fn describe(event: &TimelineEvent) -> String {
    match event {
        TimelineEvent::Committed {
            sha, author, message, ..
        } => {
            let subject = message.lines().next().unwrap_or_default();
            format!("commit   {:.7} {} ({})", sha, subject, author.login)
        }
        TimelineEvent::Labeled { label, actor, .. } => {
            format!("labeled  '{}' by {}", label.name, actor.login)
        }
        TimelineEvent::Milestoned { title, actor, .. } => {
            format!("milestone '{}' by {}", title, actor.login)
        }
        TimelineEvent::Assigned {
            assignee, actor, ..
        } => format!("assigned {} by {}", assignee.login, actor.login),
        TimelineEvent::HeadRefDeleted { actor, .. } => {
            format!("head ref deleted by {}", actor.login)
        }
        TimelineEvent::Commented(comment) => {
            format!("comment  by {}: {:.60}", comment.user.login, comment.body)
        }
        TimelineEvent::Reviewed(review) => format!(
            "review   {:?} by {} ({} inline comments)",
            review.state,
            review.user.login,
            review.comments.len()
        ),
        TimelineEvent::Merged { actor, merge_ref, .. } => format!(
            "merged   into {} by {}",
            merge_ref.as_deref().unwrap_or("?"),
            actor.login
        ),
        TimelineEvent::Other { typename } => format!("event    {typename}"),
        TimelineEvent::NewCommitsSinceReview { .. } => {
            "-- new commits since your review --".to_string()
        }
    }
}
