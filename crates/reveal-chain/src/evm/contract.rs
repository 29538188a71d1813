use alloy::sol;

sol!(
    #[derive(Debug)]
    #[sol(rpc)]
    contract RevealableCollection {
        function totalSupply() external view returns (uint256);
        function paused() external view returns (bool);
        function revealed() external view returns (bool);
    }
);
