use crate::core::Point;

/// A floating label shown next to the hovered marker.
pub trait Tooltip {
    fn text(&mut self, text: &str);
    /// Move to `at`, in container coordinates, and show.
    fn position(&mut self, at: Point);
    fn hide(&mut self);
}

/// Keeps the latest tooltip state in memory.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TooltipState {
    pub text: String,
    pub at: Option<Point>,
    pub visible: bool,
}

impl Tooltip for TooltipState {
    fn text(&mut self, text: &str) {
        self.text = text.to_string();
    }

    fn position(&mut self, at: Point) {
        self.at = Some(at);
        self.visible = true;
    }

    fn hide(&mut self) {
        self.visible = false;
    }
}

/// Tooltip for charts without hover interaction.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoTooltip;

impl Tooltip for NoTooltip {
    fn text(&mut self, _text: &str) {}
    fn position(&mut self, _at: Point) {}
    fn hide(&mut self) {}
}

impl<T: Tooltip + ?Sized> Tooltip for Box<T> {
    fn text(&mut self, text: &str) {
        (**self).text(text)
    }

    fn position(&mut self, at: Point) {
        (**self).position(at)
    }

    fn hide(&mut self) {
        (**self).hide()
    }
}
