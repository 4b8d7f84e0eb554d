use async_trait::async_trait;
use formsmith_application::FormRepository;
use formsmith_core::AppResult;
use formsmith_domain::Form;
use tokio::sync::RwLock;

/// In-memory form repository implementation.
#[derive(Debug, Default)]
pub struct InMemoryFormRepository {
    forms: RwLock<Vec<Form>>,
}

impl InMemoryFormRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self {
            forms: RwLock::new(Vec::new()),
        }
    }

    /// Creates a repository seeded with forms.
    #[must_use]
    pub fn with_forms(forms: Vec<Form>) -> Self {
        Self {
            forms: RwLock::new(forms),
        }
    }
}

#[async_trait]
impl FormRepository for InMemoryFormRepository {
    async fn load_forms(&self) -> AppResult<Vec<Form>> {
        Ok(self.forms.read().await.clone())
    }

    async fn save_forms(&self, forms: &[Form]) -> AppResult<()> {
        *self.forms.write().await = forms.to_vec();
        Ok(())
    }

    async fn clear_forms(&self) -> AppResult<()> {
        self.forms.write().await.clear();
        Ok(())
    }
}
