use crate::{
    circuit::{Circuit, Port, PortType},
    structures::logic::Logic,
    types::err::{self, ErrorKind},
};

/// The location of a fault, at a pin of a node.
pub trait FaultSite: Clone + std::fmt::Debug + 'static {
    fn node(&self) -> usize;

    fn port(&self) -> Port;

    /// The node whose output carries the good value at the fault site.
    ///
    /// For a fault at an output this is the node of the fault, and for a fault at an input this is the driver of the input.
    fn source_node(&self, circuit: &Circuit) -> Option<usize> {
        match self.port().port_type {
            PortType::Output => Some(self.node()),
            PortType::Input => circuit.node(self.node()).input(self.port().number),
        }
    }

    /// An error if the fault refers to a pin the circuit does not have.
    fn validate(&self, circuit: &Circuit) -> Result<(), ErrorKind> {
        let node = self.node();
        let Some(circuit_node) = circuit.get_node(node) else {
            return Err(err::PreconditionError::NodeOutOfRange { node }.into());
        };
        let port = self.port();
        let valid = match port.port_type {
            PortType::Output => port.number == 0,
            PortType::Input => circuit_node.input(port.number).is_some(),
        };
        match valid {
            true => Ok(()),
            false => Err(err::ConfigurationError::InvalidFaultLocation {
                node,
                port_type: port.port_type,
                port: port.number,
            }
            .into()),
        }
    }
}

/// The value a stuck-at fault holds its site at.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StuckAtKind {
    Zero,
    One,
    DontCare,
    Unknown,
    /// Any value, free to differ on each timeframe.
    Free,
}

impl StuckAtKind {
    /// The stuck value, if the value is fixed.
    pub fn value(&self) -> Option<Logic> {
        match self {
            Self::Zero => Some(Logic::Zero),
            Self::One => Some(Logic::One),
            Self::DontCare => Some(Logic::DontCare),
            Self::Unknown => Some(Logic::Unknown),
            Self::Free => None,
        }
    }
}

/// A stuck-at fault.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct StuckAt {
    pub node: usize,
    pub port: Port,
    pub kind: StuckAtKind,
}

impl StuckAt {
    pub fn new(node: usize, port: Port, kind: StuckAtKind) -> Self {
        StuckAt { node, port, kind }
    }
}

impl FaultSite for StuckAt {
    fn node(&self) -> usize {
        self.node
    }

    fn port(&self) -> Port {
        self.port
    }
}

impl std::fmt::Display for StuckAt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "stuck-at-{:?} at {} of node {}", self.kind, self.port, self.node)
    }
}

/// The transition a transition delay fault delays.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TransitionKind {
    SlowToRise,
    SlowToFall,
    SlowToTransition,
}

/// A transition delay fault.
///
/// When the good value at the site makes the transition between two timeframes, the faulty value on the later timeframe is the value before the transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TransitionDelay {
    pub node: usize,
    pub port: Port,
    pub kind: TransitionKind,
}

impl TransitionDelay {
    pub fn new(node: usize, port: Port, kind: TransitionKind) -> Self {
        TransitionDelay { node, port, kind }
    }
}

impl FaultSite for TransitionDelay {
    fn node(&self) -> usize {
        self.node
    }

    fn port(&self) -> Port {
        self.port
    }
}

impl std::fmt::Display for TransitionDelay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?} at {} of node {}", self.kind, self.port, self.node)
    }
}
