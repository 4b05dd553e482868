use std::future::Future;
use tokio::time::Duration;

use crate::error::Result;
use crate::github::queries::PageInfo;
use crate::github::repeat::{drive, LoopPolicy, Step};

/// One page of a cursor-paginated connection.
#[derive(Debug)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page_info: PageInfo,
    pub total_count: Option<u64>,
}

impl<T> Page<T> {
    pub fn last(items: Vec<T>) -> Self {
        Self {
            items,
            page_info: PageInfo::default(),
            total_count: None,
        }
    }
}

/// Everything gathered by a walk, plus whether it reached the end.
#[derive(Debug)]
pub struct Collected<T> {
    pub items: Vec<T>,
    pub pages: u32,
    pub complete: bool,
    pub total_count: Option<u64>,
}

struct Walk<T> {
    cursor: Option<String>,
    items: Vec<T>,
    total_count: Option<u64>,
}

impl<T> Walk<T> {
    fn finish(self, pages: u32, complete: bool) -> Collected<T> {
        Collected {
            items: self.items,
            pages,
            complete,
            total_count: self.total_count,
        }
    }
}

pub struct Paginator {
    label: String,
    policy: LoopPolicy,
}

impl Paginator {
    pub fn new(label: impl Into<String>, pause: Duration) -> Self {
        Self {
            label: label.into(),
            policy: LoopPolicy::pages(pause),
        }
    }

    /// Follows `endCursor` until `hasNextPage` is false or a fetch fails.
    /// A failed page ends the walk; earlier pages are kept.
    pub async fn collect<T, F, Fut>(&self, mut fetch: F) -> Collected<T>
    where
        F: FnMut(Option<String>) -> Fut,
        Fut: Future<Output = Result<Page<T>>>,
    {
        let label = self.label.as_str();
        let initial = Walk {
            cursor: None,
            items: Vec::new(),
            total_count: None,
        };

        let outcome = drive(&self.policy, initial, |mut walk, page_no| {
            let page_fut = fetch(walk.cursor.clone());
            async move {
                if page_no > 1 {
                    tracing::debug!("Fetching {} page {}", label, page_no);
                }

                let page = match page_fut.await {
                    Ok(page) => page,
                    Err(e) if e.is_access_denied() => {
                        tracing::info!("{}: access denied on page {} ({})", label, page_no, e);
                        return Step::Done(walk.finish(page_no - 1, false));
                    }
                    Err(e) => {
                        tracing::warn!(
                            "{}: page {} failed ({}), keeping {} items from earlier pages",
                            label,
                            page_no,
                            e,
                            walk.items.len()
                        );
                        return Step::Done(walk.finish(page_no - 1, false));
                    }
                };

                if page.total_count.is_some() {
                    walk.total_count = page.total_count;
                }
                walk.items.extend(page.items);

                let has_next = page.page_info.has_next_page;
                match page.page_info.end_cursor {
                    Some(next) if has_next && walk.cursor.as_deref() != Some(next.as_str()) => {
                        walk.cursor = Some(next);
                        Step::Continue(walk)
                    }
                    _ if has_next => {
                        tracing::warn!("{}: page {} claims more data but gave no new cursor", label, page_no);
                        Step::Done(walk.finish(page_no, false))
                    }
                    _ => Step::Done(walk.finish(page_no, true)),
                }
            }
        })
        .await;

        outcome.unwrap_or_else(|exhausted| exhausted.state.finish(exhausted.steps, false))
    }
}
