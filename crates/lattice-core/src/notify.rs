//! Notification bus.
//!
//! The dispatcher's contract ends at "event emitted": delivery to follower
//! inboxes is the consumer's concern. The bus is an explicit channel handed
//! to the app at construction time; nothing in the core emits through
//! hidden global state.

use serde::{Deserialize, Serialize};

use crate::prelude::*;
use lattice_types::type_uri::TypeUri;

/// One notification to one recipient
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationEvent {
	#[serde(rename = "type")]
	pub typ: TypeUri,
	pub post_id: Box<str>,
	pub follower_id: i64,
	pub view: View,
}

#[derive(Debug, Clone)]
pub struct Notifier {
	tx: flume::Sender<NotificationEvent>,
}

impl Notifier {
	/// Create a bus; the receiver half goes to the delivery consumer
	pub fn channel() -> (Self, flume::Receiver<NotificationEvent>) {
		let (tx, rx) = flume::unbounded();
		(Notifier { tx }, rx)
	}

	pub fn emit(&self, event: NotificationEvent) -> LtResult<()> {
		self.tx
			.send(event)
			.map_err(|_| Error::Internal("notification bus closed".to_string()))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_emit_and_receive() {
		let (notifier, rx) = Notifier::channel();
		let typ = TypeUri::parse("https://tent.io/types/post/status/v0.1.0").unwrap();
		notifier
			.emit(NotificationEvent {
				typ,
				post_id: "abc123".into(),
				follower_id: 1,
				view: View::Full,
			})
			.unwrap();

		let event = rx.try_recv().unwrap();
		assert_eq!(event.post_id.as_ref(), "abc123");
		assert_eq!(event.view, View::Full);
	}

	#[test]
	fn test_emit_after_receiver_dropped() {
		let (notifier, rx) = Notifier::channel();
		drop(rx);
		let typ = TypeUri::parse("https://tent.io/types/post/status/v0.1.0").unwrap();
		let res = notifier.emit(NotificationEvent {
			typ,
			post_id: "abc123".into(),
			follower_id: 1,
			view: View::Meta,
		});
		assert!(res.is_err());
	}
}

// vim: ts=4
