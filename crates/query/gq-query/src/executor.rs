//! The concurrent query executor.
//!
//! A query is a FIFO queue of [`ListJob`]s drained in bounded batches:
//! up to `worker_count` backend listings run concurrently, the whole
//! batch is awaited (a barrier), and outcomes are merged before the
//! next batch starts. Page budget is allocated to object jobs exactly,
//! so a page can never overrun and no matched item is ever dropped at a
//! page boundary; whatever the budget could not fund is deferred back
//! to the queue front and eventually rides out through the cursor.

use std::collections::VecDeque;
use std::sync::Arc;

use futures::future::join_all;
use gq_error::{GqError, Result};
use gq_pattern::{compile, CompiledPattern, Mode, Segment};
use gq_storage::{ListRequest, ListingBackend};
use tracing::debug;

use crate::cursor::{self, CursorState};
use crate::{
    CountResponse, ListJob, QueryConfig, QueryItem, QueryRequest, QueryResponse, QueryStats,
};

const PUBLIC_HOST: &str = "https://storage.googleapis.com";

/// Executes pattern queries against a listing backend.
///
/// The executor is stateless across requests: every invocation carries
/// its own queue and statistics, either freshly planned or rehydrated
/// from a cursor.
pub struct QueryExecutor {
    backend: Arc<dyn ListingBackend>,
    config: QueryConfig,
}

/// What one dispatched job reports back. Exactly one outcome per job.
#[derive(Default)]
struct JobOutcome {
    items: Vec<QueryItem>,
    new_jobs: Vec<ListJob>,
    stats: QueryStats,
}

impl QueryExecutor {
    /// Create an executor over the given backend and policy.
    pub fn new(backend: Arc<dyn ListingBackend>, config: QueryConfig) -> Self {
        Self { backend, config }
    }

    /// Run one page of a query.
    pub async fn query(&self, request: &QueryRequest) -> Result<QueryResponse> {
        let (cp, mut jobs, mut stats) = self.prepare(request)?;
        let page_size = self.config.clamp_page_size(request.page_size);

        let items = self
            .run(&cp, &mut jobs, &mut stats, Some(page_size), true)
            .await?;

        let next_cursor = if jobs.is_empty() {
            None
        } else {
            Some(cursor::encode(&CursorState {
                pattern: cp.raw.clone(),
                mode: cp.mode,
                bucket: cp.bucket.clone(),
                jobs: jobs.into_iter().collect(),
                stats,
            })?)
        };

        Ok(QueryResponse {
            capture_names: cp.capture_names.clone(),
            items,
            next_cursor,
            stats,
        })
    }

    /// Count all matches, running the walk to exhaustion without
    /// materializing items. With a cursor, the total covers the whole
    /// walk from its beginning.
    pub async fn count(&self, request: &QueryRequest) -> Result<CountResponse> {
        let (cp, mut jobs, mut stats) = self.prepare(request)?;

        self.run(&cp, &mut jobs, &mut stats, None, false).await?;

        Ok(CountResponse {
            total: stats.matched,
            stats,
        })
    }

    /// Shared validation, compilation, and cursor rehydration.
    fn prepare(
        &self,
        request: &QueryRequest,
    ) -> Result<(CompiledPattern, VecDeque<ListJob>, QueryStats)> {
        let pattern = request.pattern.trim();
        if pattern.is_empty() {
            return Err(GqError::InvalidRequest("pattern is required".to_string()));
        }
        let mode = Mode::parse(&request.mode)?;
        let cp = compile(pattern, mode)?;

        if request.cursor.is_empty() {
            let jobs = build_initial_jobs(&cp);
            return Ok((cp, jobs.into(), QueryStats::default()));
        }

        let state = cursor::decode(&request.cursor)?;
        if !state.binds_to(&cp) {
            return Err(GqError::CursorMismatch);
        }
        Ok((cp, state.jobs.into(), state.stats))
    }

    /// Drain the job queue until the page target is met or jobs run out.
    ///
    /// `page_budget` of `None` runs to exhaustion (count mode);
    /// `materialize` of `false` counts matches without building items.
    async fn run(
        &self,
        cp: &CompiledPattern,
        jobs: &mut VecDeque<ListJob>,
        stats: &mut QueryStats,
        page_budget: Option<usize>,
        materialize: bool,
    ) -> Result<Vec<QueryItem>> {
        let mut items: Vec<QueryItem> = Vec::new();
        let worker_count = self.config.effective_workers();

        loop {
            if let Some(budget) = page_budget {
                if items.len() >= budget {
                    break;
                }
            }
            if jobs.is_empty() {
                break;
            }

            let mut raw_batch: Vec<ListJob> = Vec::with_capacity(worker_count);
            while raw_batch.len() < worker_count {
                match jobs.pop_front() {
                    Some(job) => raw_batch.push(job),
                    None => break,
                }
            }

            let objects_in_batch = raw_batch.iter().filter(|j| j.is_objects()).count();
            let mut alloc_remaining = match page_budget {
                Some(budget) => budget - items.len(),
                None => objects_in_batch.saturating_mul(self.config.max_page_size),
            };

            // Fund object jobs exactly: the allocations sum to at most
            // the page remainder, so the merge below cannot overrun.
            let mut batch: Vec<(ListJob, usize)> = Vec::with_capacity(raw_batch.len());
            let mut deferred: Vec<ListJob> = Vec::new();
            let mut objects_left = objects_in_batch;
            for job in raw_batch {
                if !job.is_objects() {
                    batch.push((job, 0));
                    continue;
                }
                if alloc_remaining == 0 {
                    deferred.push(job);
                    objects_left -= 1;
                    continue;
                }
                let limit = (alloc_remaining / objects_left.max(1))
                    .max(1)
                    .min(alloc_remaining);
                batch.push((job, limit));
                alloc_remaining -= limit;
                objects_left -= 1;
            }
            for job in deferred.into_iter().rev() {
                jobs.push_front(job);
            }
            if batch.is_empty() {
                break;
            }

            debug!(
                batch = batch.len(),
                queued = jobs.len(),
                collected = items.len(),
                "dispatching listing batch"
            );

            let outcomes = join_all(
                batch
                    .iter()
                    .map(|(job, limit)| self.run_job(cp, job, *limit, materialize)),
            )
            .await;

            for outcome in outcomes {
                let outcome = outcome?;
                stats.merge(&outcome.stats);
                items.extend(outcome.items);
                jobs.extend(outcome.new_jobs);
            }
        }

        Ok(items)
    }

    /// Execute one job and report its single outcome.
    async fn run_job(
        &self,
        cp: &CompiledPattern,
        job: &ListJob,
        limit: usize,
        materialize: bool,
    ) -> Result<JobOutcome> {
        match job {
            ListJob::Segment { .. } => self.run_segment_job(cp, job).await,
            ListJob::Objects { .. } => {
                if limit == 0 {
                    // Unfunded dispatch; hand the job back untouched.
                    return Ok(JobOutcome {
                        new_jobs: vec![job.clone()],
                        ..Default::default()
                    });
                }
                self.run_objects_job(cp, job, limit, materialize).await
            }
        }
    }

    /// List one level of the delimiter tree and fan out below it.
    async fn run_segment_job(&self, cp: &CompiledPattern, job: &ListJob) -> Result<JobOutcome> {
        let ListJob::Segment {
            segment_index,
            prefix,
            page_token,
        } = job
        else {
            return Err(GqError::Internal("segment job expected".to_string()));
        };
        let segment = segment_at(cp, *segment_index)?;

        let base = ensure_trailing_slash(prefix);
        let mut request = ListRequest::new(&cp.bucket)
            .with_prefix(base.clone())
            .with_delimiter("/")
            .with_page_size(self.config.max_page_size);
        if let Some(token) = page_token {
            request = request.with_page_token(token.clone());
        }
        let page = self.backend.list(request).await?;

        let mut outcome = JobOutcome::default();
        outcome.stats.scanned_prefixes += page.prefixes.len() as u64;

        for common in &page.prefixes {
            let value = common
                .strip_prefix(base.as_str())
                .unwrap_or(common)
                .trim_end_matches('/');
            if value.is_empty() || !segment.regex.is_match(value) {
                continue;
            }

            let next_prefix = join_path(prefix, value);
            let (next_prefix, next_index) =
                advance_literal_segments(next_prefix, *segment_index as usize + 1, &cp.segments);
            if next_index >= cp.segments.len() {
                continue;
            }

            if next_index == cp.segments.len() - 1 {
                outcome
                    .new_jobs
                    .push(ListJob::objects(next_index as i32, next_prefix));
            } else {
                outcome
                    .new_jobs
                    .push(ListJob::segment(next_index as i32, next_prefix));
            }
        }

        if let Some(token) = page.next_page_token {
            outcome.new_jobs.push(job.resumed(token));
        }

        Ok(outcome)
    }

    /// Enumerate objects under the terminal prefix against the full
    /// matcher, spending at most `limit` budget across up to
    /// `prefetch_pages` backend pages.
    async fn run_objects_job(
        &self,
        cp: &CompiledPattern,
        job: &ListJob,
        limit: usize,
        materialize: bool,
    ) -> Result<JobOutcome> {
        let ListJob::Objects {
            segment_index,
            prefix,
            page_token,
        } = job
        else {
            return Err(GqError::Internal("objects job expected".to_string()));
        };

        let object_prefix = if cp.segments.is_empty() || *segment_index < 0 {
            cp.literal_prefix.clone()
        } else {
            let segment = segment_at(cp, *segment_index)?;
            join_path(prefix, &segment.literal_prefix)
        };

        let mut outcome = JobOutcome::default();
        let mut budget = limit;
        let mut token = page_token.clone();

        for _ in 0..self.config.effective_prefetch() {
            // The page is never larger than the remaining budget, so
            // the budget can only hit zero on a page's last object and
            // the resume token never skips an unexamined name.
            let mut request = ListRequest::new(&cp.bucket)
                .with_prefix(object_prefix.clone())
                .with_page_size(budget.min(self.config.max_page_size));
            if let Some(t) = &token {
                request = request.with_page_token(t.clone());
            }
            let page = self.backend.list(request).await?;

            for object in &page.objects {
                outcome.stats.scanned_objects += 1;
                let Some(captures) = cp.match_object(&object.name) else {
                    continue;
                };
                outcome.stats.matched += 1;
                if materialize {
                    outcome.items.push(QueryItem {
                        url: object_url(&cp.bucket, &object.name),
                        object: object.name.clone(),
                        captures,
                    });
                }
                budget -= 1;
                if budget == 0 {
                    break;
                }
            }

            token = page.next_page_token;
            if budget == 0 || token.is_none() {
                break;
            }
        }

        if let Some(t) = token {
            outcome.new_jobs.push(job.resumed(t));
        }

        Ok(outcome)
    }
}

/// Seed the queue for a fresh (cursorless) query.
fn build_initial_jobs(cp: &CompiledPattern) -> Vec<ListJob> {
    if cp.segments.is_empty() || cp.capture_names.is_empty() {
        // No tree to traverse; enumerate under the literal prefix.
        return vec![ListJob::objects(
            -1,
            cp.literal_prefix.trim_end_matches('/'),
        )];
    }

    let (prefix, index) = advance_literal_segments(String::new(), 0, &cp.segments);
    if index >= cp.segments.len() {
        return Vec::new();
    }
    if index == cp.segments.len() - 1 {
        vec![ListJob::objects(index as i32, prefix)]
    } else {
        vec![ListJob::segment(index as i32, prefix)]
    }
}

/// Fold literal-only segments into the prefix until the last segment or
/// a capture-bearing one is reached.
fn advance_literal_segments(
    mut prefix: String,
    mut index: usize,
    segments: &[Segment],
) -> (String, usize) {
    while index < segments.len().saturating_sub(1) && !segments[index].has_capture {
        prefix = join_path(&prefix, &segments[index].raw);
        index += 1;
    }
    (prefix, index)
}

fn segment_at(cp: &CompiledPattern, index: i32) -> Result<&Segment> {
    usize::try_from(index)
        .ok()
        .and_then(|i| cp.segments.get(i))
        .ok_or_else(|| GqError::Internal("segment index out of range".to_string()))
}

fn join_path(base: &str, part: &str) -> String {
    if base.is_empty() {
        return part.to_string();
    }
    if part.is_empty() {
        return base.to_string();
    }
    format!("{base}/{part}")
}

fn ensure_trailing_slash(value: &str) -> String {
    if value.is_empty() || value.ends_with('/') {
        return value.to_string();
    }
    format!("{value}/")
}

fn object_url(bucket: &str, object: &str) -> String {
    format!("{PUBLIC_HOST}/{bucket}/{object}")
}
