use rust_fsm::*;

state_machine! {
    session_flow(Welcome)

    Welcome(HydrateOnboarding) => Onboarding,
    Welcome(HydrateProcessing) => Processing,
    Welcome(HydrateDashboard) => Dashboard,

    Welcome(Begin) => Onboarding,
    Onboarding(Submit) => Processing,
    Processing(Succeed) => Dashboard,
    Processing(Fail) => Onboarding
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SessionStep {
    #[default]
    Welcome,
    Onboarding,
    Processing,
    Dashboard,
}

impl SessionStep {
    pub fn as_str(self) -> &'static str {
        match self {
            SessionStep::Welcome => "welcome",
            SessionStep::Onboarding => "onboarding",
            SessionStep::Processing => "processing",
            SessionStep::Dashboard => "dashboard",
        }
    }
}

impl std::fmt::Display for SessionStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionAction {
    Begin,
    Submit,
    Succeed,
    Fail,
}

fn hydrate(machine: &mut session_flow::StateMachine, step: SessionStep) -> Result<(), ()> {
    let input = match step {
        SessionStep::Welcome => return Ok(()),
        SessionStep::Onboarding => session_flow::Input::HydrateOnboarding,
        SessionStep::Processing => session_flow::Input::HydrateProcessing,
        SessionStep::Dashboard => session_flow::Input::HydrateDashboard,
    };
    machine.consume(&input).map_err(|_| ())?;
    Ok(())
}

fn expected_next_step(current: SessionStep, action: SessionAction) -> Option<SessionStep> {
    match (current, action) {
        (SessionStep::Welcome, SessionAction::Begin) => Some(SessionStep::Onboarding),
        (SessionStep::Onboarding, SessionAction::Submit) => Some(SessionStep::Processing),
        (SessionStep::Processing, SessionAction::Succeed) => Some(SessionStep::Dashboard),
        (SessionStep::Processing, SessionAction::Fail) => Some(SessionStep::Onboarding),
        _ => None,
    }
}

/// Next step for `action`, or `None` when the step does not allow it.
/// Dashboard accepts nothing: it is terminal for the session.
pub fn transition(current: SessionStep, action: SessionAction) -> Option<SessionStep> {
    let mut machine = session_flow::StateMachine::new();
    hydrate(&mut machine, current).ok()?;

    let input = match action {
        SessionAction::Begin => session_flow::Input::Begin,
        SessionAction::Submit => session_flow::Input::Submit,
        SessionAction::Succeed => session_flow::Input::Succeed,
        SessionAction::Fail => session_flow::Input::Fail,
    };

    machine.consume(&input).ok()?;
    expected_next_step(current, action)
}
