use std::fs;

use tether_core::Model;
use tether_deck::{Compiled, Study};
use tracing::info;

use crate::{Bridge, Engine, Error, Invocation, Settings};

/// Drives a model through a study run by an external engine.
///
/// A driver moves through three states. It starts unconfigured, holds a
/// mutable study once configured, and holds the frozen study and its deck
/// once compiled. Compilation is one-way: after it, the study can no longer
/// be reconfigured and every run reuses the same deck.
pub struct Driver<M: Model> {
    model: M,
    name: String,
    settings: Settings,
    state: State,
}

#[derive(Debug)]
enum State {
    Unconfigured,
    Configuring(Study),
    Compiled(Box<Compiled>),
}

impl<M: Model> Driver<M> {
    /// Creates a driver for `model`. Decks are written as `<name>.in`.
    pub fn new(model: M, name: impl Into<String>) -> Self {
        Self {
            model,
            name: name.into(),
            settings: Settings::default(),
            state: State::Unconfigured,
        }
    }

    #[must_use]
    pub fn with_settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    /// Sets the study, replacing any previously configured one.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AlreadyCompiled`] once the study has been compiled.
    pub fn configure(&mut self, study: Study) -> Result<(), Error> {
        if let State::Compiled(_) = self.state {
            return Err(Error::AlreadyCompiled);
        }
        self.state = State::Configuring(study);
        Ok(())
    }

    /// Returns the configured study for further changes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotConfigured`] before [`configure`](Self::configure),
    /// and [`Error::AlreadyCompiled`] after compilation.
    pub fn study_mut(&mut self) -> Result<&mut Study, Error> {
        match &mut self.state {
            State::Unconfigured => Err(Error::NotConfigured),
            State::Configuring(study) => Ok(study),
            State::Compiled(_) => Err(Error::AlreadyCompiled),
        }
    }

    /// Freezes the configured study and compiles it against the model's
    /// current problem declaration.
    ///
    /// On failure the study stays configured and can be fixed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotConfigured`] without a study,
    /// [`Error::AlreadyCompiled`] if called twice, or the configuration error
    /// that stopped compilation.
    pub fn compile(&mut self) -> Result<&Compiled, Error> {
        let study = match &self.state {
            State::Unconfigured => return Err(Error::NotConfigured),
            State::Configuring(study) => study,
            State::Compiled(_) => return Err(Error::AlreadyCompiled),
        };

        let compiled = study.compile(&self.model.problem())?;
        self.state = State::Compiled(Box::new(compiled));
        self.compiled().ok_or(Error::NotConfigured)
    }

    /// Returns the compiled study, if compilation has happened.
    #[must_use]
    pub fn compiled(&self) -> Option<&Compiled> {
        match &self.state {
            State::Compiled(compiled) => Some(compiled),
            _ => None,
        }
    }

    #[must_use]
    pub fn model(&self) -> &M {
        &self.model
    }

    #[must_use]
    pub fn into_model(self) -> M {
        self.model
    }

    /// Runs the study with `engine`, compiling it first if needed.
    ///
    /// The deck is written to `<work_dir>/<name>.in` before every run, and
    /// the engine's evaluation requests are answered by the model.
    ///
    /// # Errors
    ///
    /// Returns an error if the study cannot be compiled, the deck cannot be
    /// written, or the engine fails.
    pub fn run<E: Engine>(&mut self, engine: &mut E) -> Result<(), Error> {
        if let State::Configuring(_) = self.state {
            self.compile()?;
        }
        let State::Compiled(compiled) = &self.state else {
            return Err(Error::NotConfigured);
        };

        let work_dir = &self.settings.work_dir;
        fs::create_dir_all(work_dir).map_err(Error::io(work_dir))?;
        let deck = work_dir.join(format!("{}.in", self.name));
        fs::write(&deck, compiled.render()).map_err(Error::io(&deck))?;
        info!(deck = %deck.display(), "wrote deck");

        let invocation = Invocation {
            deck: &deck,
            settings: &self.settings,
        };
        let mut bridge = Bridge::new(&mut self.model, compiled);
        engine
            .run(&invocation, &mut bridge)
            .map_err(|err| Error::Engine(Box::new(err)))?;

        info!(name = %self.name, "run complete");
        Ok(())
    }
}
