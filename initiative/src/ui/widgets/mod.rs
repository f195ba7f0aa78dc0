//! TUI widgets for the initiative tracker

pub mod button_bar;
pub mod creature_selector;
pub mod info_box;
pub mod initiative_table;
pub mod input;

pub use button_bar::ButtonBarWidget;
pub use creature_selector::CreatureSelectorWidget;
pub use info_box::InfoBoxWidget;
pub use initiative_table::InitiativeTableWidget;
pub use input::InputWidget;

/// Flatten a rendered buffer into newline-separated rows
#[cfg(test)]
pub(crate) fn buffer_text(buf: &ratatui::buffer::Buffer) -> String {
    let area = buf.area;
    (area.top()..area.bottom())
        .map(|y| {
            (area.left()..area.right())
                .map(|x| buf[(x, y)].symbol())
                .collect::<String>()
        })
        .collect::<Vec<_>>()
        .join("\n")
}
