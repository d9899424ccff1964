/// How many granted votes make a candidate the leader.
///
/// `granted` always includes the candidate's own vote when it could record
/// one. `cluster_size` is the number of peers plus the candidate itself.
#[derive(Debug, Clone, Copy, Default)]
#[derive(PartialEq, Eq)]
#[derive(clap::ValueEnum)]
#[derive(serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum VoteQuorum {
    /// Leader as soon as one vote beyond its own is granted, whatever the
    /// cluster size. Two leaders may coexist in clusters of more than three
    /// nodes.
    #[default]
    SelfPlusOne,

    /// Leader only with votes from more than half of the whole cluster.
    ClusterMajority,
}

impl VoteQuorum {
    pub fn is_granted(&self, granted: u64, cluster_size: u64) -> bool {
        match self {
            VoteQuorum::SelfPlusOne => granted > 1,
            VoteQuorum::ClusterMajority => granted * 2 > cluster_size,
        }
    }
}
