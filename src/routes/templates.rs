use minijinja::{Environment, context};

use crate::db::ClassificationRecord;

/// Page templates compiled into the binary. `.html` names get HTML
/// auto-escaping.
#[derive(Debug)]
pub struct Templates {
    env: Environment<'static>,
}

impl Templates {
    pub fn new() -> Result<Self, minijinja::Error> {
        let mut env = Environment::new();
        env.add_template("index.html", include_str!("../../templates/index.html"))?;
        env.add_template("history.html", include_str!("../../templates/history.html"))?;
        Ok(Self { env })
    }

    pub fn render_index(
        &self,
        prediction: Option<&str>,
        image_url: Option<&str>,
    ) -> Result<String, minijinja::Error> {
        self.env
            .get_template("index.html")?
            .render(context! { prediction, image_url })
    }

    pub fn render_history(&self, records: &[ClassificationRecord]) -> Result<String, minijinja::Error> {
        self.env
            .get_template("history.html")?
            .render(context! { records })
    }
}
