//! The annotation tool state machine.
//!
//! Holds the armed tool, the markers placed so far and the requests issued
//! for them. Every request gets a [`Ticket`] from the session's issuer; a
//! tool switch or frame change starts a new generation, so responses that
//! arrive afterwards are recognised as stale.

use std::collections::HashMap;

use crate::model::{
    AnnotationMode, ImagePoint, InstanceId, Marker, MeasurementKind, MeasurementRequest,
    PolygonDraft, RulerSegment, Tool,
};

use super::pending::{Ticket, TicketIssuer};

/// Result of a primary-button click inside the image.
#[derive(Debug, Clone, PartialEq)]
pub enum ClickOutcome {
    /// No tool armed, or the click was rejected
    Ignored,
    /// First ruler endpoint placed; waiting for the second
    RulerFirstPlaced,
    /// Polygon vertex appended; carries the new vertex count
    VertexAdded(usize),
    /// A measurement is ready to be sent
    Submit(Ticket, MeasurementRequest),
}

/// Result of the polygon "complete" action.
#[derive(Debug, Clone, PartialEq)]
pub enum CompleteOutcome {
    /// The polygon tool is not collecting
    NotCollecting,
    /// Fewer than the minimum vertices; carries the current count
    TooFewVertices(usize),
    /// The area request is ready to be sent
    Submit(Ticket, MeasurementRequest),
}

/// Annotation state for one viewing session.
#[derive(Debug, Default)]
pub struct AnnotationSession {
    mode: AnnotationMode,
    density: Option<Marker>,
    ruler: RulerSegment,
    polygon: Option<PolygonDraft>,
    tickets: TicketIssuer,
    in_flight: HashMap<Ticket, MeasurementKind>,
}

impl AnnotationSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> AnnotationMode {
        self.mode
    }

    pub fn density_marker(&self) -> Option<&Marker> {
        self.density.as_ref()
    }

    pub fn ruler(&self) -> &RulerSegment {
        &self.ruler
    }

    pub fn polygon(&self) -> Option<&PolygonDraft> {
        self.polygon.as_ref()
    }

    pub fn generation(&self) -> u64 {
        self.tickets.generation()
    }

    /// Check if any measurement request is outstanding.
    pub fn is_busy(&self) -> bool {
        !self.in_flight.is_empty()
    }

    /// Arm a tool. Markers of every tool are discarded and requests issued
    /// so far become stale.
    pub fn select_tool(&mut self, tool: Tool) {
        self.clear_markers();
        self.in_flight.clear();
        self.tickets.bump();
        self.mode = tool.initial_mode();
        log::debug!("🖌️ Tool armed: {:?} (generation {})", tool, self.generation());
    }

    /// Disarm any tool and drop all markers.
    pub fn reset(&mut self) {
        self.clear_markers();
        self.in_flight.clear();
        self.tickets.bump();
        self.mode = AnnotationMode::Idle;
    }

    /// Handle a click at an in-bounds image point on the displayed frame.
    pub fn click(&mut self, point: ImagePoint, frame: &InstanceId) -> ClickOutcome {
        match self.mode {
            AnnotationMode::Idle => ClickOutcome::Ignored,
            AnnotationMode::Density => {
                let marker = Marker::new(frame.clone(), point);
                self.density = Some(marker);
                self.mode = AnnotationMode::Idle;
                log::debug!("Density probe at {} on {}", point, frame);
                let request = MeasurementRequest::Density {
                    instance_id: frame.clone(),
                    point,
                };
                ClickOutcome::Submit(self.issue(request.kind()), request)
            }
            AnnotationMode::RulerFirst => {
                self.ruler.first = Some(Marker::new(frame.clone(), point));
                self.ruler.second = None;
                self.mode = AnnotationMode::RulerSecond;
                log::debug!("Ruler first endpoint at {} on {}", point, frame);
                ClickOutcome::RulerFirstPlaced
            }
            AnnotationMode::RulerSecond => {
                let Some(first) = self.ruler.first.clone() else {
                    // Only reachable if the first endpoint was cleared externally
                    self.mode = AnnotationMode::RulerFirst;
                    return ClickOutcome::Ignored;
                };
                let second = Marker::new(frame.clone(), point);
                self.ruler.second = Some(second.clone());
                self.mode = AnnotationMode::Idle;
                log::debug!("Ruler second endpoint at {} on {}", point, frame);
                let request = MeasurementRequest::Distance { first, second };
                ClickOutcome::Submit(self.issue(request.kind()), request)
            }
            AnnotationMode::PolygonCollecting => {
                let polygon = self
                    .polygon
                    .get_or_insert_with(|| PolygonDraft::new(frame.clone()));
                if &polygon.instance_id != frame {
                    log::debug!(
                        "Polygon vertex on {} rejected: collection started on {}",
                        frame,
                        polygon.instance_id
                    );
                    return ClickOutcome::Ignored;
                }
                polygon.vertices.push(point);
                log::debug!("Polygon vertex {} at {}", polygon.vertices.len(), point);
                ClickOutcome::VertexAdded(polygon.vertices.len())
            }
        }
    }

    /// The polygon "complete" action.
    pub fn complete_polygon(&mut self) -> CompleteOutcome {
        if self.mode != AnnotationMode::PolygonCollecting {
            return CompleteOutcome::NotCollecting;
        }
        let Some(polygon) = self.polygon.as_mut().filter(|p| p.is_complete()) else {
            let count = self.polygon.as_ref().map_or(0, |p| p.vertices.len());
            return CompleteOutcome::TooFewVertices(count);
        };
        polygon.closed = true;
        let request = MeasurementRequest::Area {
            instance_id: polygon.instance_id.clone(),
            vertices: polygon.vertices.clone(),
        };
        self.mode = AnnotationMode::Idle;
        log::debug!("Polygon closed with {} vertices", polygon.vertices.len());
        CompleteOutcome::Submit(self.issue(request.kind()), request)
    }

    /// The displayed frame changed. Per-frame markers are dropped, ruler
    /// endpoints survive and the armed tool stays armed.
    pub fn on_frame_changed(&mut self) {
        self.density = None;
        self.polygon = None;
        self.in_flight.clear();
        self.tickets.bump();
        log::debug!("Session generation {} after frame change", self.generation());
    }

    /// Check if a response for `ticket` should be applied.
    pub fn accepts(&self, ticket: Ticket) -> bool {
        self.tickets.is_current(ticket) && self.in_flight.contains_key(&ticket)
    }

    /// Mark the request for `ticket` as finished. Returns whether its
    /// response should be applied.
    pub fn finish_request(&mut self, ticket: Ticket) -> bool {
        let accepted = self.accepts(ticket);
        if let Some(kind) = self.in_flight.remove(&ticket) {
            log::debug!("{} request {} finished", kind, ticket);
        }
        accepted
    }

    fn issue(&mut self, kind: MeasurementKind) -> Ticket {
        let ticket = self.tickets.issue();
        self.in_flight.insert(ticket, kind);
        log::debug!("Issuing {} request {}", kind, ticket);
        ticket
    }

    fn clear_markers(&mut self) {
        self.density = None;
        self.ruler.clear();
        self.polygon = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> InstanceId {
        InstanceId::from(s)
    }

    fn pt(x: u32, y: u32) -> ImagePoint {
        ImagePoint::new(x, y)
    }

    #[test]
    fn test_idle_click_ignored() {
        let mut session = AnnotationSession::new();
        assert_eq!(session.click(pt(1, 1), &id("a")), ClickOutcome::Ignored);
        assert!(session.density_marker().is_none());
    }

    #[test]
    fn test_density_click_submits_and_returns_to_idle() {
        let mut session = AnnotationSession::new();
        session.select_tool(Tool::Density);

        let outcome = session.click(pt(5, 6), &id("a"));
        let ClickOutcome::Submit(ticket, request) = outcome else {
            panic!("expected submit, got {outcome:?}");
        };
        assert_eq!(
            request,
            MeasurementRequest::Density {
                instance_id: id("a"),
                point: pt(5, 6)
            }
        );
        assert_eq!(session.mode(), AnnotationMode::Idle);
        assert_eq!(session.density_marker().unwrap().point, pt(5, 6));
        assert!(session.is_busy());
        assert!(session.finish_request(ticket));
        assert!(!session.is_busy());
    }

    #[test]
    fn test_ruler_across_frames() {
        let mut session = AnnotationSession::new();
        session.select_tool(Tool::Ruler);

        assert_eq!(session.click(pt(100, 100), &id("A")), ClickOutcome::RulerFirstPlaced);
        assert_eq!(session.mode(), AnnotationMode::RulerSecond);

        session.on_frame_changed();
        assert_eq!(session.mode(), AnnotationMode::RulerSecond);
        assert!(session.ruler().first.is_some());

        let ClickOutcome::Submit(_, request) = session.click(pt(300, 400), &id("B")) else {
            panic!("expected distance request");
        };
        assert_eq!(
            request,
            MeasurementRequest::Distance {
                first: Marker::new(id("A"), pt(100, 100)),
                second: Marker::new(id("B"), pt(300, 400)),
            }
        );
        assert_eq!(session.mode(), AnnotationMode::Idle);
    }

    #[test]
    fn test_polygon_two_vertices_rejected() {
        let mut session = AnnotationSession::new();
        session.select_tool(Tool::Polygon);
        session.click(pt(0, 0), &id("a"));
        session.click(pt(10, 0), &id("a"));

        assert_eq!(session.complete_polygon(), CompleteOutcome::TooFewVertices(2));
        assert_eq!(session.mode(), AnnotationMode::PolygonCollecting);
        assert!(!session.is_busy());
    }

    #[test]
    fn test_polygon_three_vertices_in_order() {
        let mut session = AnnotationSession::new();
        session.select_tool(Tool::Polygon);
        assert_eq!(session.click(pt(0, 0), &id("a")), ClickOutcome::VertexAdded(1));
        session.click(pt(10, 0), &id("a"));
        assert_eq!(session.click(pt(5, 8), &id("a")), ClickOutcome::VertexAdded(3));

        let CompleteOutcome::Submit(_, request) = session.complete_polygon() else {
            panic!("expected area request");
        };
        assert_eq!(
            request,
            MeasurementRequest::Area {
                instance_id: id("a"),
                vertices: vec![pt(0, 0), pt(10, 0), pt(5, 8)],
            }
        );
        assert_eq!(session.mode(), AnnotationMode::Idle);
        assert!(session.polygon().unwrap().closed);
        assert_eq!(session.complete_polygon(), CompleteOutcome::NotCollecting);
    }

    #[test]
    fn test_polygon_with_no_vertices() {
        let mut session = AnnotationSession::new();
        session.select_tool(Tool::Polygon);
        assert_eq!(session.complete_polygon(), CompleteOutcome::TooFewVertices(0));
    }

    #[test]
    fn test_polygon_rejects_other_frame() {
        let mut session = AnnotationSession::new();
        session.select_tool(Tool::Polygon);
        session.click(pt(1, 1), &id("a"));
        assert_eq!(session.click(pt(2, 2), &id("b")), ClickOutcome::Ignored);
        assert_eq!(session.polygon().unwrap().vertices.len(), 1);
    }

    #[test]
    fn test_frame_change_clears_per_frame_markers() {
        let mut session = AnnotationSession::new();
        session.select_tool(Tool::Polygon);
        session.click(pt(1, 1), &id("a"));
        session.on_frame_changed();
        assert!(session.polygon().is_none());
        assert_eq!(session.mode(), AnnotationMode::PolygonCollecting);

        // Collection restarts on the new frame
        assert_eq!(session.click(pt(2, 2), &id("b")), ClickOutcome::VertexAdded(1));

        session.select_tool(Tool::Density);
        session.click(pt(3, 3), &id("b"));
        session.on_frame_changed();
        assert!(session.density_marker().is_none());
    }

    #[test]
    fn test_tool_switch_clears_everything() {
        let mut session = AnnotationSession::new();
        session.select_tool(Tool::Ruler);
        session.click(pt(1, 1), &id("a"));
        session.select_tool(Tool::Polygon);
        assert!(session.ruler().is_empty());

        session.click(pt(1, 1), &id("a"));
        session.select_tool(Tool::Density);
        assert!(session.polygon().is_none());

        session.click(pt(1, 1), &id("a"));
        session.select_tool(Tool::Ruler);
        assert!(session.density_marker().is_none());
        assert_eq!(session.mode(), AnnotationMode::RulerFirst);
    }

    #[test]
    fn test_stale_tickets_rejected() {
        let mut session = AnnotationSession::new();
        session.select_tool(Tool::Density);
        let ClickOutcome::Submit(ticket, _) = session.click(pt(1, 1), &id("a")) else {
            panic!("expected density request");
        };

        session.on_frame_changed();
        assert!(!session.accepts(ticket));
        assert!(!session.finish_request(ticket));

        session.select_tool(Tool::Density);
        let ClickOutcome::Submit(fresh, _) = session.click(pt(1, 1), &id("b")) else {
            panic!("expected density request");
        };
        session.select_tool(Tool::Ruler);
        assert!(!session.accepts(fresh));
    }

    #[test]
    fn test_duplicate_response_applied_once() {
        let mut session = AnnotationSession::new();
        session.select_tool(Tool::Density);
        let ClickOutcome::Submit(ticket, _) = session.click(pt(1, 1), &id("a")) else {
            panic!("expected density request");
        };
        assert!(session.finish_request(ticket));
        assert!(!session.finish_request(ticket));
    }
}
