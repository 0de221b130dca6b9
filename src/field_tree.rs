use super::FieldTree;

impl<T> FieldTree<T> {
    pub fn new() -> Self {
        Self {
            token: None,
            children: Vec::new(),
        }
    }

    pub fn insert(&mut self, key: &[char], value: T) -> Result<(), T> {
        if let Some((first, rest)) = key.split_first() {
            match self.children.binary_search_by_key(first, |child| child.0) {
                Ok(index) => self.children[index].1.insert(rest, value),
                Err(index) => {
                    let mut field = FieldTree::new();
                    field.insert(rest, value)?;
                    self.children.insert(index, (*first, field));
                    Ok(())
                }
            }
        } else {
            match self.token.replace(value) {
                Some(previous) => Err(previous),
                None => Ok(()),
            }
        }
    }
}

impl<T: Copy> FieldTree<T> {
    /// Walk the tree along the window and return the value of the longest key
    /// that is a prefix of it, together with the key length.
    pub fn find_longest(&self, window: &[char], fold: impl Fn(char) -> char) -> Option<(T, usize)> {
        let mut current = self;
        let mut best = self.token.map(|value| (value, 0));
        for (index, c) in window.iter().enumerate() {
            match current
                .children
                .binary_search_by_key(&fold(*c), |child| child.0)
            {
                Ok(child) => {
                    current = &current.children[child].1;
                    if let Some(value) = current.token {
                        best = Some((value, index + 1));
                    }
                }
                Err(_) => break,
            }
        }
        best
    }
}
