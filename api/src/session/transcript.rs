use contextor::ChatTurn;

/// Ordered question/answer pairs of one session, oldest first.
///
/// Bounded: once `max_turns` is reached the oldest turn is dropped.
#[derive(Clone, Debug)]
pub struct Transcript {
    turns: Vec<ChatTurn>,
    max_turns: usize,
}

impl Transcript {
    pub fn new(max_turns: usize) -> Self {
        Self {
            turns: Vec::new(),
            max_turns: max_turns.max(1),
        }
    }

    pub fn push(&mut self, turn: ChatTurn) {
        if self.turns.len() == self.max_turns {
            self.turns.remove(0);
        }
        self.turns.push(turn);
    }

    pub fn turns(&self) -> &[ChatTurn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_insertion_order() {
        let mut t = Transcript::new(8);
        t.push(ChatTurn::new("q1", "a1"));
        t.push(ChatTurn::new("q2", "a2"));
        assert_eq!(t.len(), 2);
        assert_eq!(t.turns()[0].question, "q1");
        assert_eq!(t.turns()[1].answer, "a2");
    }

    #[test]
    fn evicts_oldest_at_capacity() {
        let mut t = Transcript::new(2);
        for i in 0..3 {
            t.push(ChatTurn::new(format!("q{i}"), "a"));
        }
        let qs: Vec<&str> = t.turns().iter().map(|x| x.question.as_str()).collect();
        assert_eq!(qs, vec!["q1", "q2"]);
    }
}
