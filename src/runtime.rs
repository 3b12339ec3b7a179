//! Connects the controller to the request thread.

use std::time::Duration;

use crate::api::{ApiError, RequestThread};
use crate::controller::ViewportController;
use crate::message::{BackendMessage, Command, Message};

/// Build the failure reply for a command that could not be sent.
fn failed(command: Command, error: ApiError) -> BackendMessage {
    match command {
        Command::LoadInstances { series } => BackendMessage::InstancesLoaded {
            series,
            result: Err(error),
        },
        Command::FetchPreview {
            ticket,
            instance_id,
            ..
        } => BackendMessage::PreviewLoaded {
            ticket,
            instance_id,
            result: Err(error),
        },
        Command::Measure { ticket, request } => BackendMessage::MeasurementCompleted {
            ticket,
            kind: request.kind(),
            result: Err(error),
        },
    }
}

/// Owns the controller and the request thread and moves messages between them.
pub struct ViewerRuntime {
    controller: ViewportController,
    worker: RequestThread,
}

impl ViewerRuntime {
    pub fn new(controller: ViewportController, worker: RequestThread) -> Self {
        Self { controller, worker }
    }

    pub fn controller(&self) -> &ViewportController {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut ViewportController {
        &mut self.controller
    }

    /// Apply a message and queue the commands it produces.
    pub fn dispatch(&mut self, message: Message) {
        let mut queue = self.controller.update(message);
        while let Some(command) = queue.pop() {
            // The thread takes ownership, so keep a copy for the failure reply
            let fallback = command.clone();
            if !self.worker.submit(command) {
                let reply = failed(fallback, ApiError::WorkerGone);
                queue.extend(self.controller.update(Message::Backend(reply)));
            }
        }
    }

    /// Feed every result that is already available back into the controller.
    /// Returns how many were processed.
    pub fn pump(&mut self) -> usize {
        let mut processed = 0;
        while let Some(reply) = self.worker.take_one_result() {
            self.dispatch(Message::Backend(reply));
            processed += 1;
        }
        processed
    }

    /// Block until no request is outstanding, waiting at most `timeout` for
    /// each result. Returns false if a wait timed out.
    pub fn settle(&mut self, timeout: Duration) -> bool {
        while self.worker.pending_count() > 0 {
            match self.worker.wait_result(timeout) {
                Some(reply) => self.dispatch(Message::Backend(reply)),
                None => {
                    log::warn!(
                        "Gave up waiting with {} requests outstanding",
                        self.worker.pending_count()
                    );
                    return false;
                }
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use image::{ImageFormat, RgbaImage};

    use super::*;
    use crate::api::{MeasurementClient, SeriesSource};
    use crate::message::{MouseButton, NavigationMessage, PointerMessage, ToolMessage};
    use crate::model::{ImagePoint, InstanceId, Marker, Tool, WindowLevel, WindowPreset};
    use crate::state::SeriesRef;

    struct TinyServer;

    impl MeasurementClient for TinyServer {
        fn density(&self, _: &InstanceId, point: ImagePoint) -> Result<i32, ApiError> {
            Ok(point.x as i32)
        }

        fn distance(&self, _: &Marker, _: &Marker) -> Result<f64, ApiError> {
            Ok(1.0)
        }

        fn area(&self, _: &InstanceId, _: &[ImagePoint]) -> Result<f64, ApiError> {
            Ok(1.0)
        }
    }

    impl SeriesSource for TinyServer {
        fn instances(&self, _: &SeriesRef) -> Result<Vec<InstanceId>, ApiError> {
            Ok(vec![InstanceId::from("only")])
        }

        fn preview(
            &self,
            _: &SeriesRef,
            _: &InstanceId,
            _: Option<WindowLevel>,
        ) -> Result<Vec<u8>, ApiError> {
            let mut bytes = Vec::new();
            RgbaImage::new(100, 100).write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
            Ok(bytes)
        }
    }

    #[test]
    fn test_round_trip_through_worker() {
        let controller = ViewportController::new(200, 200, WindowPreset::SoftTissue);
        let worker = RequestThread::spawn(TinyServer).unwrap();
        let mut runtime = ViewerRuntime::new(controller, worker);

        runtime.dispatch(Message::Navigation(NavigationMessage::OpenSeries(
            SeriesRef::new("s", "r"),
        )));
        assert!(runtime.settle(Duration::from_secs(5)));
        assert_eq!(runtime.controller().displayed_frame().unwrap().as_str(), "only");

        // 100x100 centered in 200x200
        runtime.dispatch(Message::Tool(ToolMessage::Select(Tool::Density)));
        runtime.dispatch(Message::Pointer(PointerMessage::Pressed {
            button: MouseButton::Primary,
            x: 77,
            y: 60,
        }));
        assert!(runtime.settle(Duration::from_secs(5)));
        assert_eq!(
            runtime.controller().status().unwrap().text,
            "Density at point: 27 HU"
        );
        assert_eq!(runtime.pump(), 0);
    }

    #[test]
    fn test_failed_reply_matches_command() {
        let reply = failed(
            Command::LoadInstances {
                series: SeriesRef::new("s", "r"),
            },
            ApiError::WorkerGone,
        );
        assert!(matches!(
            reply,
            BackendMessage::InstancesLoaded {
                result: Err(ApiError::WorkerGone),
                ..
            }
        ));
    }
}
