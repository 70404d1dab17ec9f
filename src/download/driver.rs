//! The download driver: authenticate, catalog, then fetch pages in order,
//! re-authenticating whenever the session runs out.

use std::collections::BTreeSet;
use std::time::Duration as StdDuration;

use chrono::{Duration, FixedOffset, Offset, Utc};
use indicatif::ProgressBar;
use rand::Rng;

use crate::api::{Authenticator, PageFetch, ReaderSite, Session};
use crate::book::{downloaded_pages, next_page, resolve_page_total, BookTarget};
use crate::config::Config;
use crate::download::clock::Clock;
use crate::download::state::DownloadState;
use crate::error::{Error, Result};
use crate::fs::PageStore;

/// Tunables of a download run.
#[derive(Debug, Clone)]
pub struct DriverOptions {
    /// A session with this much time or less left is not used for a new request.
    pub expiry_margin: Duration,
    /// Zone of calendar-style session deadlines.
    pub deadline_offset: FixedOffset,
    /// Inclusive bounds of the random pause before each page request.
    pub page_delay_ms: (u64, u64),
    /// Re-authentications allowed in a row without a page getting through.
    pub max_consecutive_reauths: u32,
}

impl DriverOptions {
    pub fn from_config(config: &Config) -> Result<Self> {
        let hours = config.options.deadline_utc_offset_hours;
        let deadline_offset = hours
            .checked_mul(3600)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| Error::ConfigValidation {
                field: "deadline_utc_offset_hours".to_string(),
                message: format!("{} is not a valid UTC offset", hours),
            })?;

        let margin = config.options.expiry_margin_seconds;
        let expiry_margin = Duration::try_seconds(margin)
            .filter(|margin| *margin >= Duration::zero())
            .ok_or_else(|| Error::ConfigValidation {
                field: "expiry_margin_seconds".to_string(),
                message: format!("{} is not a usable expiry margin", margin),
            })?;

        Ok(Self {
            expiry_margin,
            deadline_offset,
            page_delay_ms: (
                config.options.page_delay_ms_min,
                config.options.page_delay_ms_max,
            ),
            max_consecutive_reauths: config.options.max_consecutive_reauths,
        })
    }
}

impl Default for DriverOptions {
    fn default() -> Self {
        Self {
            expiry_margin: Duration::seconds(30),
            deadline_offset: FixedOffset::east_opt(8 * 3600).unwrap_or_else(|| Utc.fix()),
            page_delay_ms: (0, 0),
            max_consecutive_reauths: 5,
        }
    }
}

/// Page total and the pages found on disk when the run started.
#[derive(Debug)]
struct Catalog {
    total: u32,
    existing: BTreeSet<u32>,
}

/// Position of the fetch loop. Survives re-authentication unchanged.
#[derive(Debug)]
struct Cursor {
    catalog: Catalog,
    page: u32,
}

enum Phase {
    Authenticating { resume: Option<Cursor> },
    Cataloging { session: Session },
    Fetching { session: Session, cursor: Cursor },
    Done,
}

/// Runs the download of one book against a reader site and a page store.
pub struct DownloadDriver<'a> {
    site: &'a dyn ReaderSite,
    store: &'a dyn PageStore,
    clock: &'a dyn Clock,
    target: &'a BookTarget,
    options: DriverOptions,
    progress: ProgressBar,
}

impl<'a> DownloadDriver<'a> {
    pub fn new(
        site: &'a dyn ReaderSite,
        store: &'a dyn PageStore,
        clock: &'a dyn Clock,
        target: &'a BookTarget,
        options: DriverOptions,
    ) -> Self {
        Self {
            site,
            store,
            clock,
            target,
            options,
            progress: ProgressBar::hidden(),
        }
    }

    /// Report page progress on `bar`; its length is set once the total is known.
    pub fn with_progress(mut self, bar: ProgressBar) -> Self {
        self.progress = bar;
        self
    }

    /// Download every page not yet in the store.
    ///
    /// Returns once all pages are stored. Login refusal, unreadable remote
    /// pages and storage errors end the run with `Err`; expired or denied
    /// sessions are renewed and the interrupted page is requested again.
    pub async fn run(&self) -> Result<DownloadState> {
        let authenticator =
            Authenticator::new(self.site, self.target, self.options.deadline_offset);
        let mut state = DownloadState::new(self.target.directory_key().to_string());
        let mut reauth_streak = 0u32;
        let mut phase = Phase::Authenticating { resume: None };

        loop {
            phase = match phase {
                Phase::Authenticating { resume } => {
                    let session = authenticator.login().await?;
                    state.logins += 1;
                    if state.book_name.is_none() {
                        state.book_name = session.book_name().map(str::to_string);
                        state.creator = session.creator().map(str::to_string);
                    }

                    match resume {
                        Some(cursor) => Phase::Fetching { session, cursor },
                        None => Phase::Cataloging { session },
                    }
                }

                Phase::Cataloging { session } => {
                    let total = resolve_page_total(self.site, &session).await?;
                    let existing = downloaded_pages(self.store, total);

                    state.page_total = Some(total);
                    state.already_present = existing.len() as u32;
                    self.progress.set_length(u64::from(total));
                    self.progress.set_position(existing.len() as u64);
                    if !existing.is_empty() {
                        tracing::info!(
                            "Already downloaded {} of {} pages, skipping them.",
                            existing.len(),
                            total
                        );
                    }

                    match next_page(total, &existing, None) {
                        Some(page) => Phase::Fetching {
                            session,
                            cursor: Cursor {
                                catalog: Catalog { total, existing },
                                page,
                            },
                        },
                        None => Phase::Done,
                    }
                }

                Phase::Fetching { session, cursor } => {
                    self.fetch_step(session, cursor, &mut state, &mut reauth_streak)
                        .await?
                }

                Phase::Done => {
                    self.progress.finish_and_clear();
                    tracing::info!(
                        "Book {} complete: {} pages downloaded, {} already present.",
                        self.target.directory_key(),
                        state.downloaded_count(),
                        state.already_present
                    );
                    return Ok(state);
                }
            };
        }
    }

    /// One iteration of the fetch loop for `cursor.page`.
    async fn fetch_step(
        &self,
        session: Session,
        cursor: Cursor,
        state: &mut DownloadState,
        reauth_streak: &mut u32,
    ) -> Result<Phase> {
        let page = cursor.page;
        // The freshness check must be the last thing before the request.
        self.pause().await;
        let now = self.clock.now();
        if !session.is_fresh_at(now, self.options.expiry_margin) {
            tracing::warn!(
                "Session expiring ({}s left), re-authenticating before page {}.",
                session.remaining(now).num_seconds(),
                page
            );
            self.note_reauth(state, reauth_streak)?;
            return Ok(Phase::Authenticating {
                resume: Some(cursor),
            });
        }

        tracing::info!("Getting page {}.", page);

        match self.site.get_page_image(&session, page).await? {
            PageFetch::Denied(status) => {
                state.denied += 1;
                tracing::warn!(
                    "Page {} denied (HTTP {}), re-authenticating.",
                    page,
                    status
                );
                self.note_reauth(state, reauth_streak)?;
                Ok(Phase::Authenticating {
                    resume: Some(cursor),
                })
            }

            PageFetch::Image(_)
                if !session.is_fresh_at(self.clock.now(), self.options.expiry_margin) =>
            {
                tracing::warn!(
                    "Session expired while page {} was in flight, re-authenticating.",
                    page
                );
                self.note_reauth(state, reauth_streak)?;
                Ok(Phase::Authenticating {
                    resume: Some(cursor),
                })
            }

            PageFetch::Image(bytes) => {
                self.store.write(page, &bytes).await?;
                tracing::info!("Got page {}.", page);
                state.record_page(page);
                *reauth_streak = 0;
                self.progress.inc(1);

                let next = next_page(cursor.catalog.total, &cursor.catalog.existing, Some(page));
                Ok(match next {
                    Some(next) => Phase::Fetching {
                        session,
                        cursor: Cursor {
                            page: next,
                            ..cursor
                        },
                    },
                    None => Phase::Done,
                })
            }
        }
    }

    fn note_reauth(&self, state: &mut DownloadState, reauth_streak: &mut u32) -> Result<()> {
        if *reauth_streak >= self.options.max_consecutive_reauths {
            return Err(Error::ReauthLimit(self.options.max_consecutive_reauths));
        }
        *reauth_streak += 1;
        state.reauthentications += 1;
        Ok(())
    }

    /// Random pause before a page request, if configured.
    async fn pause(&self) {
        let (min, max) = self.options.page_delay_ms;
        if max == 0 {
            return;
        }
        let delay_ms = if min >= max {
            max
        } else {
            rand::thread_rng().gen_range(min..=max)
        };
        self.clock.sleep(StdDuration::from_millis(delay_ms)).await;
    }
}
