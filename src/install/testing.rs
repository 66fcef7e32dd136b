//! Scripted provisioner for orchestration tests

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};

use super::error::InstallError;
use super::provisioner::Provisioner;
use super::spec::{Component, DependencySpec};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Behaviour {
    /// Install succeeds and the component is present right away.
    Installs,
    /// Install succeeds, but the next `n` presence checks still fail.
    AppearsAfter(u32),
    /// Install reports an error.
    Fails,
    /// Install reports success but the component never shows up.
    Lies,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Call {
    Present(Component),
    Install(Component),
}

#[derive(Debug, Default)]
pub struct ScriptedProvisioner {
    present: RefCell<HashSet<Component>>,
    pending: RefCell<HashMap<Component, u32>>,
    behaviours: HashMap<Component, Behaviour>,
    calls: RefCell<Vec<Call>>,
}

impl ScriptedProvisioner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_present(self, components: &[Component]) -> Self {
        self.present.borrow_mut().extend(components.iter().copied());
        self
    }

    pub fn with(mut self, component: Component, behaviour: Behaviour) -> Self {
        self.behaviours.insert(component, behaviour);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn installs(&self) -> Vec<Component> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|call| match call {
                Call::Install(component) => Some(*component),
                Call::Present(_) => None,
            })
            .collect()
    }

    pub fn is_present(&self, component: Component) -> bool {
        self.present.borrow().contains(&component)
    }
}

impl Provisioner for ScriptedProvisioner {
    async fn present(&self, spec: &DependencySpec) -> bool {
        self.calls.borrow_mut().push(Call::Present(spec.component));

        if let Some(remaining) = self.pending.borrow_mut().get_mut(&spec.component) {
            if *remaining > 0 {
                *remaining -= 1;
                return false;
            }
        }
        self.is_present(spec.component)
    }

    async fn install(&self, spec: &DependencySpec) -> Result<(), InstallError> {
        let component = spec.component;
        self.calls.borrow_mut().push(Call::Install(component));

        match self.behaviours.get(&component).copied().unwrap_or(Behaviour::Installs) {
            Behaviour::Installs => {
                self.present.borrow_mut().insert(component);
                Ok(())
            }
            Behaviour::AppearsAfter(checks) => {
                self.pending.borrow_mut().insert(component, checks);
                self.present.borrow_mut().insert(component);
                Ok(())
            }
            Behaviour::Fails => Err(InstallError::ExitStatus {
                program: format!("{component}-installer"),
                status: "exit status: 1".into(),
                detail: ": scripted failure".into(),
            }),
            Behaviour::Lies => Ok(()),
        }
    }
}
