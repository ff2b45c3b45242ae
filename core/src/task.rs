/*
 * task.rs
 * Copyright (C) 2026 Chris Burdess
 *
 * This file is part of Fuel, an HTTP client engine.
 *
 * Fuel is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * Fuel is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with Fuel.  If not, see <http://www.gnu.org/licenses/>.
 */

//! Execution wrapper.
//!
//! A call is Built until dispatched onto the tokio runtime, where the
//! blocking exchange and deserialization run on the blocking pool behind an
//! optional concurrency semaphore. State changes are published on a watch
//! channel so any number of observers can wait for the outcome. Cancelling
//! before dispatch drops the job; cancelling in flight shuts the socket down.

use std::fmt;
use std::future::{Future, IntoFuture};
use std::net::{Shutdown, TcpStream};
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tokio::runtime::Handle;
use tokio::sync::{watch, Semaphore};
use tokio::task::JoinHandle;
use url::Url;

use crate::deserializable::{self, BytesDeserializer, Deserializable, StringDeserializer};
use crate::error::{ErrorKind, FuelError};
use crate::http::encoder::encode_parameters;
use crate::http::{Request, Response};

/// Response paired with the typed outcome.
pub type ResponseResultOf<T> = (Response, Result<T, FuelError>);

type Outcome<T> = Result<(Response, T), FuelError>;
type Job<T> = Box<dyn FnOnce() -> Outcome<T> + Send>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    Built,
    Dispatched,
    Completed,
    Failed,
    Cancelled,
}

impl TaskState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskState::Completed | TaskState::Failed | TaskState::Cancelled)
    }
}

#[derive(Default)]
struct CancelState {
    cancelled: AtomicBool,
    socket: Mutex<Option<TcpStream>>,
}

/// Shared cancellation flag plus the socket of the exchange in flight.
#[derive(Clone, Default)]
pub struct CancelHandle {
    inner: Arc<CancelState>,
}

impl CancelHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark cancelled and shut down the registered socket, if any.
    pub fn cancel(&self) {
        self.inner.cancelled.store(true, Ordering::SeqCst);
        if let Some(socket) = self.lock().take() {
            tracing::debug!("shutting down in-flight connection");
            let _ = socket.shutdown(Shutdown::Both);
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }

    /// Track the socket of a new exchange. Shuts it down at once when the
    /// call is already cancelled.
    pub(crate) fn register(&self, socket: &TcpStream) {
        match socket.try_clone() {
            Ok(clone) => {
                let mut slot = self.lock();
                if self.is_cancelled() {
                    let _ = clone.shutdown(Shutdown::Both);
                }
                *slot = Some(clone);
            }
            Err(e) => tracing::debug!(error = %e, "socket not cancellable"),
        }
    }

    /// Drop the tracked socket handle.
    pub(crate) fn release(&self) {
        self.lock().take();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<TcpStream>> {
        self.inner.socket.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for CancelHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CancelHandle")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

/// Encode parameters, then run interceptors, the transport and response
/// interceptors.
pub(crate) fn perform(request: Request) -> Result<Response, FuelError> {
    if request.options().cancel.is_cancelled() {
        return Err(FuelError::cancelled(Response::error(request.url().clone())));
    }
    let request = encode_parameters(request);
    let transform = request.options().request_transformer.clone();
    let mut request = transform(request)?;
    request.prepare_body()?;
    let client = request.options().client.clone();
    let response = client.execute_request(&mut request)?;
    let transform = request.options().response_transformer.clone();
    transform(&request, response)
}

/// Any outcome observed after cancellation is reported as cancellation.
fn settle<T>(cancel: &CancelHandle, outcome: Outcome<T>) -> Outcome<T> {
    cancel.release();
    if !cancel.is_cancelled() {
        return outcome;
    }
    match outcome {
        Err(e) if e.kind() == ErrorKind::Cancelled => Err(e),
        Err(e) => Err(e.with_kind(ErrorKind::Cancelled)),
        Ok((response, _)) => Err(FuelError::cancelled(response.snapshot())),
    }
}

fn project<T>(outcome: Outcome<T>) -> ResponseResultOf<T> {
    match outcome {
        Ok((response, value)) => (response, Ok(value)),
        Err(e) => (e.response().snapshot(), Err(e)),
    }
}

fn deserialize_job<D>(request: Request, deserializer: D) -> Job<D::Output>
where
    D: Deserializable + Send + 'static,
    D::Output: Send + 'static,
{
    let cancel = request.options().cancel.clone();
    Box::new(move || {
        let outcome = perform(request).and_then(|r| deserializable::deserialize(&deserializer, r));
        settle(&cancel, outcome)
    })
}

fn raw_job(request: Request) -> Job<()> {
    let cancel = request.options().cancel.clone();
    Box::new(move || settle(&cancel, perform(request).map(|r| (r, ()))))
}

/// A call that can be dispatched, awaited and cancelled.
pub struct CancellableRequest<T> {
    url: Url,
    cancel: CancelHandle,
    permits: Option<Arc<Semaphore>>,
    state: Arc<watch::Sender<TaskState>>,
    job: Option<Job<T>>,
    handle: Option<JoinHandle<Outcome<T>>>,
}

impl<T: Send + 'static> CancellableRequest<T> {
    fn new(request: Request, job: impl FnOnce(Request) -> Job<T>) -> Self {
        let (state, _) = watch::channel(TaskState::Built);
        let url = request.url().clone();
        let cancel = request.options().cancel.clone();
        let permits = request.options().permits.clone();
        Self {
            url,
            cancel,
            permits,
            state: Arc::new(state),
            job: Some(job(request)),
            handle: None,
        }
    }

    pub fn state(&self) -> TaskState {
        *self.state.borrow()
    }

    /// Observe state changes; any number of receivers may wait on the outcome.
    pub fn subscribe(&self) -> watch::Receiver<TaskState> {
        self.state.subscribe()
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Cancel the call. Before dispatch the network is never touched; in
    /// flight the connection is shut down.
    pub fn cancel(&self) {
        self.cancel.cancel();
        self.state.send_if_modified(|s| {
            if *s == TaskState::Built {
                *s = TaskState::Cancelled;
                true
            } else {
                false
            }
        });
    }

    /// Hand the job to the current tokio runtime. Returns false when already
    /// dispatched, cancelled, or called outside a runtime.
    pub fn dispatch(&mut self) -> bool {
        if self.handle.is_some() || self.cancel.is_cancelled() {
            return false;
        }
        let Ok(runtime) = Handle::try_current() else {
            return false;
        };
        let Some(job) = self.job.take() else {
            return false;
        };
        let state = self.state.clone();
        let permits = self.permits.clone();
        let url = self.url.clone();
        self.state.send_replace(TaskState::Dispatched);
        tracing::trace!(url = %url, "dispatching request");
        self.handle = Some(runtime.spawn(async move {
            let _permit = match permits {
                Some(p) => p.acquire_owned().await.ok(),
                None => None,
            };
            let outcome = match tokio::task::spawn_blocking(job).await {
                Ok(outcome) => outcome,
                Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
                Err(_) => Err(FuelError::cancelled(Response::error(url))),
            };
            let terminal = match &outcome {
                Ok(_) => TaskState::Completed,
                Err(e) if e.kind() == ErrorKind::Cancelled => TaskState::Cancelled,
                Err(_) => TaskState::Failed,
            };
            state.send_replace(terminal);
            outcome
        }));
        true
    }

    /// Dispatch if needed and wait for the outcome.
    pub async fn join(mut self) -> ResponseResultOf<T> {
        self.dispatch();
        let outcome = match self.handle.take() {
            Some(handle) => match handle.await {
                Ok(outcome) => outcome,
                Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
                Err(_) => Err(FuelError::cancelled(Response::error(self.url.clone()))),
            },
            None => match self.job.take() {
                Some(job) if !self.cancel.is_cancelled() => {
                    // Not on a tokio runtime: run in place.
                    let outcome = job();
                    self.state.send_replace(if outcome.is_ok() {
                        TaskState::Completed
                    } else {
                        TaskState::Failed
                    });
                    outcome
                }
                _ => {
                    self.state.send_replace(TaskState::Cancelled);
                    Err(FuelError::cancelled(Response::error(self.url.clone())))
                }
            },
        };
        project(outcome)
    }
}

impl<T: Send + 'static> IntoFuture for CancellableRequest<T> {
    type Output = ResponseResultOf<T>;
    type IntoFuture = Pin<Box<dyn Future<Output = ResponseResultOf<T>> + Send>>;

    fn into_future(self) -> Self::IntoFuture {
        Box::pin(self.join())
    }
}

impl<T> fmt::Debug for CancellableRequest<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CancellableRequest")
            .field("url", &self.url.as_str())
            .field("state", &*self.state.borrow())
            .finish()
    }
}

/// Execution entry points. All are projections of one outcome.
impl Request {
    /// Build a cancellable call deserializing with `deserializer`.
    pub fn task<D>(self, deserializer: D) -> CancellableRequest<D::Output>
    where
        D: Deserializable + Send + 'static,
        D::Output: Send + 'static,
    {
        CancellableRequest::new(self, move |r| deserialize_job(r, deserializer))
    }

    /// Build a cancellable call yielding the raw response with its body unread.
    pub fn raw_task(self) -> CancellableRequest<()> {
        CancellableRequest::new(self, raw_job)
    }

    /// Raw response, body still streaming.
    pub async fn response(self) -> Result<Response, FuelError> {
        let (response, result) = self.raw_task().join().await;
        result.map(|_| response)
    }

    pub async fn response_bytes(self) -> ResponseResultOf<Vec<u8>> {
        self.task(BytesDeserializer).join().await
    }

    pub async fn response_string(self) -> ResponseResultOf<String> {
        self.task(StringDeserializer::new()).join().await
    }

    pub async fn response_object<D>(self, deserializer: D) -> ResponseResultOf<D::Output>
    where
        D: Deserializable + Send + 'static,
        D::Output: Send + 'static,
    {
        self.task(deserializer).join().await
    }

    /// Response paired with the result.
    pub async fn await_response_result<D>(self, deserializer: D) -> ResponseResultOf<D::Output>
    where
        D: Deserializable + Send + 'static,
        D::Output: Send + 'static,
    {
        self.task(deserializer).join().await
    }

    pub async fn await_result<D>(self, deserializer: D) -> Result<D::Output, FuelError>
    where
        D: Deserializable + Send + 'static,
        D::Output: Send + 'static,
    {
        self.task(deserializer).join().await.1
    }

    /// The typed value; use `?` to propagate the failure.
    pub async fn await_object<D>(self, deserializer: D) -> Result<D::Output, FuelError>
    where
        D: Deserializable + Send + 'static,
        D::Output: Send + 'static,
    {
        self.await_result(deserializer).await
    }

    /// `(value, error)`, exactly one of which is set.
    pub async fn await_pair<D>(self, deserializer: D) -> (Option<D::Output>, Option<FuelError>)
    where
        D: Deserializable + Send + 'static,
        D::Output: Send + 'static,
    {
        split(self.await_result(deserializer).await)
    }

    pub async fn await_response_pair<D>(
        self,
        deserializer: D,
    ) -> (Response, (Option<D::Output>, Option<FuelError>))
    where
        D: Deserializable + Send + 'static,
        D::Output: Send + 'static,
    {
        let (response, result) = self.task(deserializer).join().await;
        (response, split(result))
    }

    /// Run on the calling thread; the response body is left unread.
    pub fn execute(self) -> Result<Response, FuelError> {
        raw_job(self)().map(|(response, _)| response)
    }

    /// Run and deserialize on the calling thread.
    pub fn response_result<D>(self, deserializer: D) -> ResponseResultOf<D::Output>
    where
        D: Deserializable + Send + 'static,
        D::Output: Send + 'static,
    {
        project(deserialize_job(self, deserializer)())
    }
}

fn split<T>(result: Result<T, FuelError>) -> (Option<T>, Option<FuelError>) {
    match result {
        Ok(v) => (Some(v), None),
        Err(e) => (None, Some(e)),
    }
}
