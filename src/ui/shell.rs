use std::fmt;

use thiserror::Error;

/// Title drawn in the window header.
pub const WINDOW_TITLE: &str = "Contact App";

/// Named view layouts the shell knows how to load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Template {
    /// Window frame: header tabs, a central region, and the footer.
    MainLayout,
    /// Welcome view with the contact count and shortcuts.
    HomeScreen,
    /// Contact list with a detail pane.
    PersonList,
}

impl Template {
    pub const ALL: [Template; 3] = [
        Template::MainLayout,
        Template::HomeScreen,
        Template::PersonList,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Template::MainLayout => "MainLayout",
            Template::HomeScreen => "HomeScreen",
            Template::PersonList => "PersonList",
        }
    }

    /// Look a template up by name, ignoring case and surrounding whitespace.
    pub fn load(name: &str) -> Result<Self, ViewError> {
        let wanted = name.trim();
        Self::ALL
            .into_iter()
            .find(|template| template.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ViewError::UnknownTemplate(wanted.to_string()))
    }

    /// Layouts host other views and cannot be nested inside one.
    pub fn is_layout(self) -> bool {
        matches!(self, Template::MainLayout)
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ViewError {
    #[error("No view named `{0}`")]
    UnknownTemplate(String),
    #[error("`{0}` is a layout and cannot be shown inside another view")]
    NestedLayout(Template),
    #[error("The window has no content yet")]
    NotStarted,
}

/// What the window currently shows. Owned by `App` and only changed through
/// `show_initial` and `show_view`.
#[derive(Debug, Default)]
pub struct Shell {
    root: Option<Template>,
    center: Option<Template>,
}

impl Shell {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the template as the whole window content, dropping whatever was
    /// in the central region.
    pub fn show_initial(&mut self, name: &str) -> Result<Template, ViewError> {
        let template = Template::load(name)?;
        self.root = Some(template);
        self.center = None;
        Ok(template)
    }

    /// Swap the central region when the window is framed by a layout, or the
    /// whole window otherwise.
    pub fn show_view(&mut self, name: &str) -> Result<Template, ViewError> {
        let template = Template::load(name)?;
        match self.root {
            None => Err(ViewError::NotStarted),
            Some(root) if root.is_layout() => {
                if template.is_layout() {
                    return Err(ViewError::NestedLayout(template));
                }
                self.center = Some(template);
                Ok(template)
            }
            Some(_) => {
                self.root = Some(template);
                self.center = None;
                Ok(template)
            }
        }
    }

    pub fn root(&self) -> Option<Template> {
        self.root
    }

    pub fn center(&self) -> Option<Template> {
        self.center
    }

    /// The view that owns keyboard input: the central region inside a layout,
    /// otherwise the root itself.
    pub fn active(&self) -> Option<Template> {
        match self.root {
            Some(root) if root.is_layout() => self.center,
            other => other,
        }
    }

    pub fn is_framed(&self) -> bool {
        self.root.is_some_and(Template::is_layout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_is_case_insensitive_and_trims() {
        assert_eq!(Template::load(" personlist "), Ok(Template::PersonList));
        assert_eq!(
            Template::load("Settings"),
            Err(ViewError::UnknownTemplate("Settings".to_string()))
        );
    }

    #[test]
    fn show_view_before_start_is_rejected() {
        let mut shell = Shell::new();
        assert_eq!(shell.show_view("HomeScreen"), Err(ViewError::NotStarted));
    }

    #[test]
    fn layout_root_swaps_only_the_center() {
        let mut shell = Shell::new();
        shell.show_initial("MainLayout").unwrap();
        assert!(shell.is_framed());
        assert_eq!(shell.active(), None);

        shell.show_view("HomeScreen").unwrap();
        shell.show_view("PersonList").unwrap();
        assert_eq!(shell.root(), Some(Template::MainLayout));
        assert_eq!(shell.center(), Some(Template::PersonList));
        assert_eq!(shell.active(), Some(Template::PersonList));
    }

    #[test]
    fn layout_cannot_nest_inside_itself() {
        let mut shell = Shell::new();
        shell.show_initial("MainLayout").unwrap();
        shell.show_view("HomeScreen").unwrap();
        assert_eq!(
            shell.show_view("MainLayout"),
            Err(ViewError::NestedLayout(Template::MainLayout))
        );
        assert_eq!(shell.center(), Some(Template::HomeScreen));
    }

    #[test]
    fn failed_swap_keeps_current_content() {
        let mut shell = Shell::new();
        shell.show_initial("MainLayout").unwrap();
        shell.show_view("PersonList").unwrap();
        assert!(shell.show_view("Nope").is_err());
        assert_eq!(shell.active(), Some(Template::PersonList));
    }

    #[test]
    fn bare_root_is_replaced_wholesale() {
        let mut shell = Shell::new();
        shell.show_initial("HomeScreen").unwrap();
        assert!(!shell.is_framed());
        shell.show_view("PersonList").unwrap();
        assert_eq!(shell.root(), Some(Template::PersonList));
        assert_eq!(shell.center(), None);
        assert_eq!(shell.active(), Some(Template::PersonList));
    }

    #[test]
    fn unknown_initial_view_is_an_error() {
        let mut shell = Shell::new();
        assert!(matches!(
            shell.show_initial("Missing"),
            Err(ViewError::UnknownTemplate(_))
        ));
        assert_eq!(shell.root(), None);
    }
}
