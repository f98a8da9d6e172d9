macro_rules! id_wrapper {
    ($struct: ident, $inner: ty, $doc: literal) => {
        #[doc = $doc]
        #[derive(Debug, Hash, PartialEq, Eq, Clone, Copy, PartialOrd, Ord)]
        #[cfg_attr(
            feature = "serde",
            derive(serde::Serialize, serde::Deserialize),
            serde(transparent)
        )]
        #[repr(transparent)]
        pub struct $struct(pub $inner);

        impl From<$inner> for $struct {
            fn from(value: $inner) -> Self {
                Self(value)
            }
        }

        impl From<$struct> for $inner {
            fn from(value: $struct) -> Self {
                value.0
            }
        }

        impl std::fmt::Display for $struct {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                self.0.fmt(f)
            }
        }
    };
}

id_wrapper!(
    Location,
    usize,
    "A city in the topology, addressed by its dense index into the distance table"
);
id_wrapper!(TaskId, u32, "The host-assigned identifier of an auctioned task");
id_wrapper!(VehicleId, u32, "The identifier of one of the agent's vehicles");
id_wrapper!(
    AgentId,
    u32,
    "The identifier of an auction participant, doubling as its index into the bid vector"
);

impl AgentId {
    /// The position of this agent's bid in the host's per-agent bid sequence
    pub fn index(self) -> usize {
        self.0 as usize
    }
}
