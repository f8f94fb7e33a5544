//! Link groups service
//!
//! Link groups live in their own collection. Nothing renders them yet;
//! they are created, listed, deleted, and carried through export/import.

use crate::database::{Collection, LinkGroup, Repository};
use crate::error::Result;

#[derive(Clone)]
pub struct LinkGroupsService {
    repo: Repository,
}

impl LinkGroupsService {
    pub fn new(repo: Repository) -> Self {
        Self { repo }
    }

    pub async fn create_link_group(&self, group: &LinkGroup) -> Result<()> {
        self.repo.put(Collection::LinkGroup, group).await?;
        tracing::info!("Created link group: {}", group.id);
        Ok(())
    }

    /// All groups, ascending by `sort`
    pub async fn get_link_groups(&self) -> Result<Vec<LinkGroup>> {
        let mut groups: Vec<LinkGroup> = self.repo.get_all(Collection::LinkGroup).await?;
        groups.sort_by_key(|group| group.sort);
        Ok(groups)
    }

    pub async fn delete_link_group(&self, id: &str) -> Result<()> {
        self.repo.delete(Collection::LinkGroup, id).await?;
        tracing::info!("Deleted link group: {}", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{create_memory_pool, LinkType};

    #[tokio::test]
    async fn test_create_list_delete() {
        let service = LinkGroupsService::new(Repository::new(create_memory_pool().await.unwrap()));

        for (id, sort) in [("g2", 1), ("g1", 0)] {
            service
                .create_link_group(&LinkGroup {
                    id: id.to_string(),
                    link_type: LinkType::LinkGroup,
                    name: format!("Group {}", id),
                    sort,
                    description: String::new(),
                    parent_id: "home".to_string(),
                })
                .await
                .unwrap();
        }

        let ids: Vec<String> = service
            .get_link_groups()
            .await
            .unwrap()
            .into_iter()
            .map(|g| g.id)
            .collect();
        assert_eq!(ids, vec!["g1", "g2"]);

        service.delete_link_group("g1").await.unwrap();
        assert_eq!(service.get_link_groups().await.unwrap().len(), 1);
    }
}
