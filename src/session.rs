//! Upload sequencing.
//!
//! Each upload takes a ticket when it starts. When its decode finishes, the
//! result is published only if no newer upload has started since; anything
//! older is dropped, even if it finishes last. A failed decode never replaces
//! the published dataset.

use log::{debug, warn};

use crate::{
    decode::DecodeOptions,
    error::{DecodeError, DecodeResult},
    pipeline::{self, Dataset},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UploadTicket(u64);

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Completion {
    Published,
    /// A newer upload started after this one; its result was discarded.
    Superseded,
}

#[derive(Debug, Default)]
pub struct Session {
    issued: u64,
    current: Option<(UploadTicket, Dataset)>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin_upload(&mut self) -> UploadTicket {
        self.issued += 1;
        debug!("Upload #{} started", self.issued);
        UploadTicket(self.issued)
    }

    pub fn is_latest(&self, ticket: UploadTicket) -> bool {
        ticket.0 == self.issued
    }

    /// Publishes `result` if `ticket` is still the newest upload.
    ///
    /// Errors are returned only for the newest upload; a superseded failure is
    /// as irrelevant as a superseded success.
    pub fn complete(
        &mut self,
        ticket: UploadTicket,
        result: DecodeResult<Dataset>,
    ) -> DecodeResult<Completion> {
        if !self.is_latest(ticket) {
            warn!(
                "Discarding result of upload #{} (upload #{} is newer)",
                ticket.0, self.issued
            );
            return Ok(Completion::Superseded);
        }
        let dataset = result?;
        self.current = Some((ticket, dataset));
        Ok(Completion::Published)
    }

    /// Runs a whole upload synchronously and publishes it.
    pub fn upload(
        &mut self,
        name: &str,
        bytes: &[u8],
        options: &DecodeOptions,
    ) -> DecodeResult<&Dataset> {
        let ticket = self.begin_upload();
        let result = pipeline::load_bytes(name, bytes, options);
        self.complete(ticket, result)?;
        self.current().ok_or(DecodeError::EmptyFile)
    }

    pub fn current(&self) -> Option<&Dataset> {
        self.current.as_ref().map(|(_, dataset)| dataset)
    }

    pub fn current_ticket(&self) -> Option<UploadTicket> {
        self.current.as_ref().map(|(ticket, _)| *ticket)
    }
}
