//! Interactive event loop: one line per user gesture, remote fetches run on a
//! spawned task and report back through a channel.

use std::{io::Write, sync::Arc};

use anyhow::Result;
use chrono::Utc;
use client_core::{
    ArticleListController, FetchFailure, FetchTicket, LoadMoreOutcome, LoadMoreStep,
};
use shared::domain::{Article, SortColumn};
use tokio::{
    io::{AsyncBufRead, AsyncBufReadExt},
    sync::mpsc,
};
use tracing::{debug, warn};

use crate::render::TableRenderer;

type FetchDone = (FetchTicket, Result<Vec<Article>, FetchFailure>);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Gesture {
    LoadMore,
    Sort(SortColumn),
    Show,
    Help,
    Quit,
}

fn parse_gesture(line: &str) -> Option<Gesture> {
    let mut parts = line.split_whitespace();
    let verb = parts.next()?.to_ascii_lowercase();
    match verb.as_str() {
        "more" | "m" => Some(Gesture::LoadMore),
        "show" | "s" => Some(Gesture::Show),
        "help" | "h" | "?" => Some(Gesture::Help),
        "quit" | "q" | "exit" => Some(Gesture::Quit),
        "sort" => parts.next()?.parse().ok().map(Gesture::Sort),
        "words" | "w" => Some(Gesture::Sort(SortColumn::Words)),
        "submitted" | "date" | "d" => Some(Gesture::Sort(SortColumn::PublishAt)),
        _ => None,
    }
}

const HELP: &str = "commands: more | sort words | sort submitted | show | quit";

pub async fn run<R, W>(
    controller: &mut ArticleListController,
    renderer: &TableRenderer,
    input: R,
    out: &mut W,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let (done_tx, mut done_rx) = mpsc::unbounded_channel::<FetchDone>();
    let mut lines = input.lines();

    renderer.render(out, controller.state(), Utc::now())?;
    writeln!(out, "{HELP}")?;

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    // Scripted input: let an outstanding fetch land before exiting.
                    if controller.state().fetch_in_flight {
                        if let Some((ticket, result)) = done_rx.recv().await {
                            controller.finish_fetch(ticket, result);
                            renderer.render(out, controller.state(), Utc::now())?;
                        }
                    }
                    break;
                };
                let Some(gesture) = parse_gesture(&line) else {
                    if !line.trim().is_empty() {
                        writeln!(out, "unknown command '{}'; {HELP}", line.trim())?;
                    }
                    continue;
                };
                debug!(?gesture, "user gesture");
                match gesture {
                    Gesture::Quit => break,
                    Gesture::Help => writeln!(out, "{HELP}")?,
                    Gesture::Show => renderer.render(out, controller.state(), Utc::now())?,
                    Gesture::Sort(column) => {
                        if let Err(err) = controller.click_sort(column).await {
                            warn!(error = %err, "failed to save sort snapshot");
                        }
                        renderer.render(out, controller.state(), Utc::now())?;
                    }
                    Gesture::LoadMore => match controller.begin_load_more() {
                        LoadMoreStep::Done(LoadMoreOutcome::FetchInFlight) => {
                            writeln!(out, "still fetching more articles...")?;
                        }
                        LoadMoreStep::Done(_) => {
                            renderer.render(out, controller.state(), Utc::now())?;
                        }
                        LoadMoreStep::Fetch(ticket) => {
                            let source = Arc::clone(controller.source());
                            let done_tx = done_tx.clone();
                            tokio::spawn(async move {
                                let result = source.fetch_more().await;
                                let _ = done_tx.send((ticket, result));
                            });
                            writeln!(out, "fetching more articles...")?;
                        }
                    },
                }
            }
            Some((ticket, result)) = done_rx.recv() => {
                if controller.finish_fetch(ticket, result) == LoadMoreOutcome::FetchFailed {
                    writeln!(out, "could not load more articles; try again")?;
                } else {
                    renderer.render(out, controller.state(), Utc::now())?;
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use client_core::ArticleSource;
    use shared::domain::Profile;
    use storage::{load_snapshot, MemoryStore};

    struct FixedSource {
        bundled: Vec<Article>,
        remote: Vec<Article>,
    }

    #[async_trait]
    impl ArticleSource for FixedSource {
        fn bundled(&self) -> &[Article] {
            &self.bundled
        }

        async fn fetch_more(&self) -> Result<Vec<Article>, FetchFailure> {
            Ok(self.remote.clone())
        }
    }

    fn articles(prefix: &str, count: u64) -> Vec<Article> {
        (0..count)
            .map(|i| Article {
                title: format!("{prefix} {i}"),
                image: String::new(),
                profile: Profile {
                    first_name: "Evelyn".to_string(),
                    last_name: "Boyd".to_string(),
                },
                words: (1000 - i) as f64,
                publish_at: "20240101".to_string(),
            })
            .collect()
    }

    fn controller(bundled: u64, remote: u64, store: Arc<MemoryStore>) -> ArticleListController {
        let source = Arc::new(FixedSource {
            bundled: articles("local", bundled),
            remote: articles("remote", remote),
        });
        ArticleListController::new(source, store)
    }

    #[test]
    fn parses_gestures_and_aliases() {
        assert_eq!(parse_gesture("more"), Some(Gesture::LoadMore));
        assert_eq!(
            parse_gesture("sort submitted"),
            Some(Gesture::Sort(SortColumn::PublishAt))
        );
        assert_eq!(parse_gesture("W"), Some(Gesture::Sort(SortColumn::Words)));
        assert_eq!(parse_gesture("sort title"), None);
        assert_eq!(parse_gesture("   "), None);
    }

    #[tokio::test]
    async fn scripted_session_loads_and_sorts() {
        let store = Arc::new(MemoryStore::new());
        let mut controller = controller(30, 0, store.clone());
        let mut out = Vec::new();

        run(
            &mut controller,
            &TableRenderer { show_images: false },
            &b"more\nsort words\nbogus\nquit\nmore\n"[..],
            &mut out,
        )
        .await
        .expect("session");

        let text = String::from_utf8(out).expect("utf8");
        assert!(text.contains("Unpublished Articles (20)"));
        assert!(text.contains("unknown command 'bogus'"));
        assert_eq!(controller.stop(), 20, "input after quit is ignored");
        let snapshot = load_snapshot(store.as_ref())
            .await
            .expect("load")
            .expect("sort saved a snapshot");
        assert_eq!(snapshot.stop, 20);
        assert_eq!(snapshot.articles.first().map(|a| a.words), Some(971.0));
    }

    #[tokio::test]
    async fn remote_fetch_lands_before_scripted_input_ends() {
        let mut controller = controller(5, 10, Arc::new(MemoryStore::new()));
        let mut out = Vec::new();

        run(
            &mut controller,
            &TableRenderer { show_images: false },
            &b"more\n"[..],
            &mut out,
        )
        .await
        .expect("session");

        let text = String::from_utf8(out).expect("utf8");
        assert!(text.contains("fetching more articles..."));
        assert_eq!(controller.state().articles.len(), 15);
        assert_eq!(controller.stop(), 20);
        assert!(!controller.state().fetch_in_flight);
    }
}
