pub mod format;
pub mod pump;
pub mod session;
pub mod source;

use std::sync::Arc;

use futures::StreamExt;
use tracing::{Instrument, debug, info};

use crate::{
    common::{RelayError, types::{ByteStream, VideoId}},
    configs::RelayConfig,
    sources::youtube::id::validate_id,
};

pub use format::{FormatDescriptor, StreamLocator, select_format};
pub use session::{RelayOutcome, RelaySession, SessionState};
pub use source::VideoResolver;

/// A stream whose headers may now be committed.
pub struct Relayed {
    pub format: FormatDescriptor,
    pub body: ByteStream,
}

/// Validates, resolves, selects and pipes one video per request.
#[derive(Clone)]
pub struct StreamRelay {
    resolver: Arc<dyn VideoResolver>,
    config: RelayConfig,
}

impl StreamRelay {
    pub fn new(resolver: Arc<dyn VideoResolver>, config: RelayConfig) -> Self {
        Self { resolver, config }
    }

    pub fn validate_identifier(id: &str) -> bool {
        validate_id(id)
    }

    pub async fn resolve_formats(&self, id: &VideoId) -> Result<Vec<FormatDescriptor>, RelayError> {
        self.resolver.resolve_formats(id).await
    }

    pub fn select_format(descriptors: &[FormatDescriptor]) -> Option<&FormatDescriptor> {
        select_format(descriptors)
    }

    /// Runs a full session for `raw_id`. On success the returned body is
    /// already being fed by a background pump.
    pub async fn handle(&self, raw_id: &str) -> Result<Relayed, RelayError> {
        let mut session = RelaySession::new(raw_id);
        let span = session.span().clone();

        async move {
            match self.prepare(&mut session).await {
                Ok(format) => self.relay(format, session).await,
                Err(e) => {
                    session.fail(&e);
                    Err(e)
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn prepare(&self, session: &mut RelaySession) -> Result<FormatDescriptor, RelayError> {
        session.advance(SessionState::Validating);
        if !Self::validate_identifier(session.video()) {
            return Err(RelayError::InvalidIdentifier(session.video().to_string()));
        }
        let id = VideoId::from(session.video().to_string());

        session.advance(SessionState::Resolving);
        let descriptors = self.resolve_formats(&id).await?;
        debug!("{} resolved {} format(s)", self.resolver.name(), descriptors.len());

        session.advance(SessionState::Selecting);
        let format = Self::select_format(&descriptors)
            .cloned()
            .ok_or(RelayError::NoSuitableFormat)?;
        info!(
            "selected itag={} quality={} container={:?} mime={}",
            format.itag, format.quality, format.container, format.mime_type
        );
        Ok(format)
    }

    /// Opens the upstream for `format` and starts copying it. The first item
    /// is awaited here so that an upstream that fails immediately can still be
    /// reported with an error status.
    pub async fn relay(
        &self,
        format: FormatDescriptor,
        mut session: RelaySession,
    ) -> Result<Relayed, RelayError> {
        session.advance(SessionState::Streaming);

        let mut upstream = match self
            .resolver
            .open_byte_source(&format, self.config.high_water_mark)
            .await
        {
            Ok(upstream) => upstream,
            Err(e) => {
                session.fail(&e);
                return Err(e);
            }
        };

        let upstream = match upstream.next().await {
            None => futures::stream::empty().boxed(),
            Some(Err(e)) => {
                let err = RelayError::Stream(e.to_string());
                session.fail(&err);
                return Err(err);
            }
            Some(Ok(first)) => futures::stream::once(async move { Ok(first) })
                .chain(upstream)
                .boxed(),
        };

        let (pump, body) = pump::channel(upstream, &self.config);
        let span = session.span().clone();
        tokio::spawn(
            async move {
                let outcome = pump.run().await;
                session.finish(&outcome);
            }
            .instrument(span),
        );

        Ok(Relayed { format, body })
    }
}
